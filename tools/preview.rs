/// Preview — interactive shell for playing dialogue scripts through a presenter.
///
/// Usage: preview --script <phases.ron> [--config <presenter.ron>] [--manual]
///
/// Commands:
///   speak <index|name>  — speak a phase
///   next                — speak the phase after the current one
///   line <phase> <n>    — interrupt with one line of a phase
///   enter <tag>         — simulate something entering the trigger volume
///   tick <seconds>      — advance the clock
///   advance             — release a manual-mode wait
///   stop                — abort playback
///   reset               — allow every phase to be spoken again
///   status              — show presenter state
///   help                — list commands
///   quit                — exit

use dialogue_presenter::core::phases::{PhaseDirector, PhaseEvent, PhaseScript};
use dialogue_presenter::core::presenter::{Presenter, PresenterEvent};
use dialogue_presenter::schema::config::{PlayMode, PresenterConfig};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut script_path = None;
    let mut config_path = None;
    let mut manual = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--script" if i + 1 < args.len() => {
                i += 1;
                script_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--manual" => {
                manual = true;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(script_path) = script_path else {
        eprintln!("ERROR: --script is required");
        std::process::exit(1);
    };

    let script = match PhaseScript::load_from_ron(Path::new(&script_path)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ERROR: Failed to load script: {}", e);
            std::process::exit(1);
        }
    };

    let mut config = match config_path {
        Some(ref path) => match PresenterConfig::load_from_ron(Path::new(path)) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("ERROR: Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => PresenterConfig::default(),
    };
    if manual {
        config.mode = PlayMode::Manual;
    }

    let mut presenter = match Presenter::new(config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };
    let mut director = PhaseDirector::new(script);
    let out = director.start(&mut presenter);
    report(&mut director, out.events, out.presenter_events);

    println!("Loaded {} phases", director.script().phases.len());
    println!("Mode: {:?}", presenter.mode());
    println!("Type 'help' for commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "speak" => {
                if parts.len() < 2 {
                    println!("Usage: speak <index|name>");
                    continue;
                }
                let out = match parts[1].parse::<usize>() {
                    Ok(index) => director.speak_phase(index, &mut presenter),
                    Err(_) => director.speak_phase_by_name(parts[1], &mut presenter),
                };
                report(&mut director, out.events, out.presenter_events);
            }
            "next" => {
                let out = director.speak_next_phase(&mut presenter);
                report(&mut director, out.events, out.presenter_events);
            }
            "line" => {
                let indices: Vec<usize> = parts[1..].iter().filter_map(|p| p.parse().ok()).collect();
                if indices.len() < 2 {
                    println!("Usage: line <phase> <n>");
                    continue;
                }
                let out = director.speak_line_from_phase(indices[0], indices[1], &mut presenter);
                report(&mut director, out.events, out.presenter_events);
            }
            "enter" => {
                let tag = parts.get(1).copied().unwrap_or("Player");
                let out = director.on_trigger_enter(tag, &mut presenter);
                report(&mut director, out.events, out.presenter_events);
            }
            "tick" => {
                let dt = match parts
                    .get(1)
                    .and_then(|s| s.parse::<f32>().ok())
                    .and_then(|s| Duration::try_from_secs_f32(s).ok())
                {
                    Some(dt) => dt,
                    None => {
                        println!("Usage: tick <seconds>");
                        continue;
                    }
                };
                let events = presenter.tick(dt);
                report(&mut director, Vec::new(), events);
            }
            "advance" | "a" => {
                let events = presenter.advance();
                report(&mut director, Vec::new(), events);
            }
            "stop" => {
                let events = director.stop(&mut presenter);
                report(&mut director, Vec::new(), events);
            }
            "reset" => {
                director.reset_all();
                println!("All phases can be spoken again.");
            }
            "status" => {
                println!("  playback: {:?}", presenter.playback());
                println!("  queued:   {}", presenter.queue_len());
                match presenter.current_line() {
                    Some(line) => println!("  current:  {:?}", line.text),
                    None => println!("  current:  none"),
                }
                println!("  visible:  {:?}", presenter.visible_surface());
                println!("  phase:    {:?}", director.current_phase());
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for commands.", cmd);
            }
        }
    }
}

/// Print what happened, resolving completion tokens through the director.
fn report(
    director: &mut PhaseDirector,
    phase_events: Vec<PhaseEvent>,
    presenter_events: Vec<PresenterEvent>,
) {
    for event in phase_events {
        print_phase_event(director, &event);
    }
    for event in presenter_events {
        match event {
            PresenterEvent::SurfaceShown { surface, text } => {
                println!("  [surface {}] {}", surface.0, text);
            }
            PresenterEvent::SurfaceHidden { surface } => {
                println!("  [surface {}] (hidden)", surface.0);
            }
            PresenterEvent::LineCompleted { token } => {
                for phase_event in director.on_line_completed(token) {
                    print_phase_event(director, &phase_event);
                }
            }
            PresenterEvent::StreamExhausted => {
                println!("  -- end of dialogue --");
            }
        }
    }
}

fn print_phase_event(director: &PhaseDirector, event: &PhaseEvent) {
    let name = |i: usize| {
        director
            .script()
            .phases
            .get(i)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    };
    match event {
        PhaseEvent::PhaseStarted { phase } => println!("  >> phase '{}' started", name(*phase)),
        PhaseEvent::PhaseFinished { phase } => println!("  << phase '{}' finished", name(*phase)),
        PhaseEvent::AllPhasesComplete => println!("  == all phases complete =="),
    }
}

fn print_usage() {
    println!("Usage: preview --script <phases.ron> [--config <presenter.ron>] [--manual]");
    println!();
    println!("Options:");
    println!("  --script <path>   Phase script (RON)");
    println!("  --config <path>   Presenter configuration (RON)");
    println!("  --manual          Force manual advance mode");
}

fn print_help() {
    println!("Commands:");
    println!("  speak <index|name>  Speak a phase");
    println!("  next                Speak the phase after the current one");
    println!("  line <phase> <n>    Interrupt with one line of a phase");
    println!("  enter <tag>         Simulate a trigger-enter (default tag: Player)");
    println!("  tick <seconds>      Advance the clock");
    println!("  advance             Release a manual-mode wait");
    println!("  stop                Abort playback");
    println!("  reset               Allow every phase to be spoken again");
    println!("  status              Show presenter state");
    println!("  help                Show this help");
    println!("  quit                Exit");
}

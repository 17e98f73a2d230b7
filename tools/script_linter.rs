/// Script Linter — validates dialogue phase scripts and quiz decks.
///
/// Usage: script_linter <path> [--quiz <deck.ron>]
///
/// `<path>` is a phase script or a directory of them.

use dialogue_presenter::core::phases::PhaseScript;
use dialogue_presenter::core::quiz::QuizDeck;
use dialogue_presenter::schema::line::SurfaceId;
use std::collections::HashSet;
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: script_linter <path> [--quiz <deck.ron>]");
        process::exit(0);
    }

    let script_path = &args[1];
    let mut quiz_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--quiz" && i + 1 < args.len() {
            i += 1;
            quiz_path = Some(args[i].clone());
        }
        i += 1;
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let path = Path::new(script_path);
    if path.is_file() {
        lint_script_file(path, &mut errors, &mut warnings);
    } else if path.is_dir() {
        lint_scripts_recursive(path, &mut errors, &mut warnings);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", script_path);
        process::exit(1);
    }

    if let Some(ref quiz) = quiz_path {
        match QuizDeck::load_from_ron(Path::new(quiz)) {
            Ok(deck) => {
                println!("  Loaded quiz: {} ({} questions)", quiz, deck.questions.len());
                lint_deck(&deck, &mut warnings);
            }
            Err(e) => errors.push(format!("{}: {}", quiz, e)),
        }
    }

    println!("\n=== Script Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_scripts_recursive(dir: &Path, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                lint_scripts_recursive(&path, errors, warnings);
            } else if path.extension().and_then(|s| s.to_str()) == Some("ron") {
                lint_script_file(&path, errors, warnings);
            }
        }
    }
}

fn lint_script_file(path: &Path, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    match PhaseScript::load_from_ron(path) {
        Ok(script) => {
            println!("  Loaded: {} ({} phases)", path.display(), script.phases.len());
            let label = path.display().to_string();
            lint_script(&label, &script, errors, warnings);
        }
        Err(e) => errors.push(format!("{}: {}", path.display(), e)),
    }
}

fn lint_script(
    label: &str,
    script: &PhaseScript,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let mut names = HashSet::new();
    for (i, phase) in script.phases.iter().enumerate() {
        if !names.insert(phase.name.as_str()) {
            errors.push(format!(
                "{}: phase {} reuses name '{}'; lookups by name will only find the first",
                label, i, phase.name
            ));
        }
        if phase.lines.is_empty() {
            warnings.push(format!("{}: phase '{}' has no dialogue lines", label, phase.name));
        }
        if phase.lines.iter().any(|l| l.trim().is_empty()) {
            warnings.push(format!("{}: phase '{}' has a blank line", label, phase.name));
        }
        if phase.panel == Some(SurfaceId::PRIMARY) {
            warnings.push(format!(
                "{}: phase '{}' uses the primary surface as its panel",
                label, phase.name
            ));
        }
    }

    let triggers = &script.triggers;
    let auto_start = triggers.speak_on_start || triggers.speak_on_trigger_enter;
    if auto_start && triggers.start_phase >= script.phases.len() {
        errors.push(format!(
            "{}: start phase {} is out of range ({} phases)",
            label,
            triggers.start_phase,
            script.phases.len()
        ));
    }
    if triggers.speak_on_trigger_enter && triggers.player_tag.is_empty() {
        warnings.push(format!("{}: trigger-enter is enabled with an empty player tag", label));
    }
}

fn lint_deck(deck: &QuizDeck, warnings: &mut Vec<String>) {
    for (i, q) in deck.questions.iter().enumerate() {
        if q.choices.len() < 2 {
            warnings.push(format!("question {} has fewer than two choices", i));
        }
        if q.reward == 0 && q.penalty == 0 {
            warnings.push(format!("question {} neither rewards nor penalizes", i));
        }
    }
    if deck.questions.is_empty() {
        warnings.push("quiz deck has no questions".to_string());
    }
}

/// Template Linter — compiles every event and synopsis template and checks
/// that each slot names a role its node declares.
///
/// Usage: template_linter [--quiet]

use saga_engine::core::grammar::Template;
use saga_engine::core::tree::NodeKind;
use saga_engine::schema::development::Development;
use saga_engine::schema::event::{EventKind, StoryKind};
use saga_engine::schema::plot::PlotKind;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut quiet = false;
    for arg in &args[1..] {
        match arg.as_str() {
            "--quiet" | "-q" => quiet = true,
            "--help" | "-h" => {
                println!("Usage: template_linter [--quiet]");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(2);
            }
        }
    }

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut checked = 0usize;

    for kind in EventKind::ALL {
        let node = StoryKind::Event(*kind);
        let templates = kind.templates();
        if templates.is_empty() && !kind.is_transient() {
            errors.push(format!("{:?} has no templates and is not transient", kind));
        }
        let families = [Some(templates), kind.one_piece_templates()];
        for source in families.into_iter().flatten().flat_map(|t| t.iter()) {
            checked += 1;
            lint(&format!("{:?}", kind), source, &node, &mut errors);
        }
        if templates.len() == 1 && !kind.is_transient() {
            warnings.push(format!("{:?} has a single template and will repeat verbatim", kind));
        }
    }

    for development in Development::ALL {
        let node = PlotKind::Development(*development);
        let synopsis = development.synopsis();
        if synopsis.is_empty() {
            errors.push(format!("{:?} has no synopsis", development));
        }
        for source in synopsis {
            checked += 1;
            lint(&format!("{:?} synopsis", development), source, &node, &mut errors);
        }
    }

    println!("Checked {} templates", checked);
    println!("\n=== Template Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }
    if !quiet {
        for warning in &warnings {
            println!("WARNING: {}", warning);
        }
    }
    for error in &errors {
        println!("ERROR: {}", error);
    }
    println!("\nSummary: {} errors, {} warnings", errors.len(), warnings.len());

    process::exit(if errors.is_empty() { 0 } else { 1 });
}

fn lint<K: NodeKind>(owner: &str, source: &str, kind: &K, errors: &mut Vec<String>) {
    match Template::parse(source) {
        Ok(template) => {
            if let Err(e) = template.check_roles(kind) {
                errors.push(format!("{}: '{}': {}", owner, source, e));
            }
        }
        Err(e) => errors.push(format!("{}: {}", owner, e)),
    }
}

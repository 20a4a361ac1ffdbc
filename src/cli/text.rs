//! Expand and reverse command implementations

use std::io::Read;
use std::process::ExitCode;

use crate::error::Result;
use crate::templates::TemplateEngine;

use super::{EXIT_ERROR, EXIT_SUCCESS};

fn read_input(text: Option<&str>) -> Result<String> {
    match text {
        Some(text) => Ok(text.to_string()),
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer.trim_end_matches(['\r', '\n']).to_string())
        }
    }
}

fn run_with(text: Option<&str>, transform: impl Fn(&TemplateEngine, &str) -> String) -> ExitCode {
    let result = TemplateEngine::new().and_then(|engine| Ok(transform(&engine, &read_input(text)?)));
    match result {
        Ok(output) => {
            println!("{}", output);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Execute the expand command
pub(super) fn run_expand(text: Option<&str>) -> ExitCode {
    run_with(text, TemplateEngine::expand)
}

/// Execute the reverse command
pub(super) fn run_reverse(text: Option<&str>) -> ExitCode {
    run_with(text, TemplateEngine::reverse)
}

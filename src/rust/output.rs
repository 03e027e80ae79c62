// SPDX-FileCopyrightText: 2025 KVPROVE Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Output formatting module for CLI
//!
//! Provides JSON and pretty-printed text output with colors

use anyhow::Result;
use colored::Colorize;
use kvprove::verification::{PhaseSummary, VerificationReport};
use kvprove::provers::smtlib;
use kvprove::Obligation;
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid output format: {}. Must be 'text' or 'json'", s)),
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Output formatter for different output formats
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn error(&self, message: &str) -> Result<()> {
        match self.format {
            OutputFormat::Text => eprintln!("{}", message.red().bold()),
            OutputFormat::Json => self.output_json(&JsonMessage {
                level: "error",
                message,
            })?,
        }
        Ok(())
    }

    pub fn info(&self, message: &str) -> Result<()> {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => self.output_json(&JsonMessage {
                level: "info",
                message,
            })?,
        }
        Ok(())
    }

    /// Output a section header
    pub fn header(&self, title: &str) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                println!("\n{}", title.bold().underline());
                println!("{}", "=".repeat(title.len()));
            }
            OutputFormat::Json => self.output_json(&JsonMessage {
                level: "header",
                message: title,
            })?,
        }
        Ok(())
    }

    /// Output a single result line
    pub fn result(&self, message: &str) -> Result<()> {
        match self.format {
            OutputFormat::Text => println!("  {}", message.cyan()),
            OutputFormat::Json => self.output_json(&JsonMessage {
                level: "result",
                message,
            })?,
        }
        Ok(())
    }

    /// Output obligations as the SMT-LIB problems handed to the provers
    pub fn smtlib(&self, obligations: &[Obligation]) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                for obligation in obligations {
                    println!("{}", smtlib::render_obligation(obligation));
                }
            }
            OutputFormat::Json => {
                let rendered: Vec<JsonSmtlib> = obligations
                    .iter()
                    .map(|o| JsonSmtlib {
                        name: &o.name,
                        smtlib: smtlib::render_obligation(o),
                    })
                    .collect();
                self.output_json(&rendered)?;
            }
        }
        Ok(())
    }

    /// Output the result of a verification run
    pub fn report(&self, target: &str, report: &VerificationReport) -> Result<()> {
        let unsolved = report.unsolved();
        match self.format {
            OutputFormat::Text => {
                for summary in &report.phases {
                    println!(
                        "  {:<24} {} open, {} ms",
                        summary.phase.to_string().cyan(),
                        summary.remaining,
                        summary.elapsed_ms
                    );
                }
                println!();
                if report.is_verified() {
                    println!("{}", "Verified!".green().bold());
                } else {
                    println!(
                        "{}",
                        format!("{} unsolved obligation(s)", unsolved.len()).red().bold()
                    );
                    for obligation in &unsolved {
                        println!("\n{}", obligation.render().yellow());
                    }
                }
            }
            OutputFormat::Json => self.output_json(&JsonReport {
                target,
                verified: report.is_verified(),
                phases: &report.phases,
                unsolved: unsolved
                    .iter()
                    .map(|o| JsonObligation {
                        obligation: o,
                        rendered: o.render(),
                    })
                    .collect(),
            })?,
        }
        Ok(())
    }

    fn output_json<T: Serialize>(&self, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)?;
        println!("{}", json);
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonMessage<'a> {
    level: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct JsonObligation<'a> {
    #[serde(flatten)]
    obligation: &'a Obligation,
    rendered: String,
}

#[derive(Serialize)]
struct JsonSmtlib<'a> {
    name: &'a str,
    smtlib: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    target: &'a str,
    verified: bool,
    phases: &'a [PhaseSummary],
    unsolved: Vec<JsonObligation<'a>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Text.to_string(), "text");
    }
}

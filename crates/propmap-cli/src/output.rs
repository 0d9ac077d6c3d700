//! Output formatting and writing utilities
//!
//! This module formats converted values, inspection reports and type
//! listings as JSON, YAML or human-readable text, and writes them together
//! with status messages.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::report::{InspectionReport, Segment, Selection, TypeListing};
use colored::Colorize;
use propmap_core::{TypeKind, Value};
use serde::Serialize;
use std::io::{self, Write};
use tracing::{debug, trace};

/// Trait for formatting output with specialized support for report types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a converted value
    fn format_value(&self, value: &Value) -> Result<String>;

    /// Format a resolution report
    fn format_inspection(&self, report: &InspectionReport) -> Result<String>;

    /// Format declared types and registered converters
    fn format_type_listing(&self, listing: &TypeListing) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // Human output falls back to pretty JSON
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_value(&self, value: &Value) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_value_human(value)),
            _ => self.format(value),
        }
    }

    fn format_inspection(&self, report: &InspectionReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_inspection_human(report)),
            _ => self.format(report),
        }
    }

    fn format_type_listing(&self, listing: &TypeListing) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_type_listing_human(listing)),
            _ => self.format(listing),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self::with_writer(format, use_color, quiet, verbose, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        verbose: u8,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            verbose,
            writer,
        }
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write debug information if verbose mode is enabled
    pub fn debug(&mut self, message: &str) -> Result<()> {
        if self.verbose == 0 || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "DEBUG:".dimmed(), message.dimmed()))
        } else {
            self.writeln(&format!("DEBUG: {}", message))
        }
    }

    /// Write a converted value
    pub fn value(&mut self, value: &Value) -> Result<()> {
        trace!(kind = value.kind_name(), "Outputting converted value");
        let formatted = self.format.format_value(value)?;
        self.emit(&formatted)
    }

    /// Write a resolution report
    pub fn inspection(&mut self, report: &InspectionReport) -> Result<()> {
        let formatted = self.format.format_inspection(report)?;
        self.emit(&formatted)
    }

    /// Write a type listing
    pub fn type_listing(&mut self, listing: &TypeListing) -> Result<()> {
        let formatted = self.format.format_type_listing(listing)?;
        self.emit(&formatted)
    }

    // YAML already ends with a newline
    fn emit(&mut self, formatted: &str) -> Result<()> {
        if formatted.ends_with('\n') {
            self.write(formatted)
        } else {
            self.writeln(formatted)
        }
    }
}

/// Format a converted value for human reading
///
/// Values are shown as pretty JSON; typed objects carry their class under
/// the `__type` key.
fn format_value_human(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        Value::DateTime(_) | Value::Bool(_) | Value::Integer(_) | Value::Float(_) => {
            value.to_json().to_string()
        }
        Value::Array(_) | Value::Map(_) | Value::Object(_) => {
            serde_json::to_string_pretty(&value.to_json()).unwrap_or_else(|_| value.to_json().to_string())
        }
    }
}

/// Format a resolution report for human reading
fn format_inspection_human(report: &InspectionReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("═══ Resolution of {} ═══\n\n", report.target_type));
    if let Some(source_type) = report.source_type {
        output.push_str(&format!("Source type: {}\n\n", source_type));
    }

    for (position, entry) in report.path.iter().enumerate() {
        let segment = match entry.segment {
            Segment::Simple => "simple",
            Segment::Class => "class",
            Segment::Interface => "interface",
            Segment::Object => "fallback",
        };
        output.push_str(&format!("{}. {} ({})\n", position + 1, entry.type_name, segment));

        if entry.candidates.is_empty() {
            output.push_str("   no converters registered\n");
        }
        for candidate in &entry.candidates {
            let sources: Vec<&str> = candidate.source_types.iter().map(|s| s.as_str()).collect();
            output.push_str(&format!(
                "   • {} [priority {}] from {}\n",
                candidate.converter,
                candidate.priority,
                sources.join(", ")
            ));
        }
    }

    match &report.selection {
        Some(Selection::Selected { converter }) => {
            output.push_str(&format!("\nSelected converter: {}\n", converter));
        }
        Some(Selection::Failed { message, .. }) => {
            output.push_str(&format!("\nNo converter selected: {}\n", message));
        }
        None => {}
    }

    output
}

/// Format a type listing for human reading
fn format_type_listing_human(listing: &TypeListing) -> String {
    let mut output = String::new();

    output.push_str(&format!("═══ Types ({}) ═══\n\n", listing.types.len()));
    for entry in &listing.types {
        let declaration = &entry.declaration;
        let kind = match declaration.kind {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
        };
        output.push_str(&format!("{} {}", kind, declaration.name));
        if let Some(parent) = &declaration.parent {
            output.push_str(&format!(" extends {}", parent));
        }
        if !declaration.interfaces.is_empty() {
            let keyword = match declaration.kind {
                TypeKind::Class => "implements",
                TypeKind::Interface => "extends",
            };
            output.push_str(&format!(" {} {}", keyword, declaration.interfaces.join(", ")));
        }
        output.push('\n');
        for (name, type_spec) in &declaration.properties {
            output.push_str(&format!("    {}: {}\n", name, type_spec));
        }
    }

    output.push_str(&format!("\n═══ Converters ({}) ═══\n\n", listing.converters.len()));
    for converter in &listing.converters {
        let sources: Vec<&str> = converter.source_types.iter().map(|s| s.as_str()).collect();
        output.push_str(&format!(
            "{} → {} [priority {}] from {}\n",
            converter.name,
            converter.target_type,
            converter.priority,
            sources.join(", ")
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    include!("output/tests.rs");
}

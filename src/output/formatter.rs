//! Console output formatting
//!
//! A plain implementation for dumb terminals and log capture, and a
//! colored implementation for interactive use. Both render the same
//! content; the factory picks one based on the color configuration.

use crate::models::{BenchmarkReport, LoadTestReport};
use colored::Colorize;

/// Main trait for console output formatting
pub trait OutputFormatter: Send + Sync {
    /// Format the run header
    fn format_header(&self, image: &str) -> String;

    /// Format the environment metrics section
    fn format_environment(&self, report: &BenchmarkReport) -> String;

    /// Format the load test aggregate section
    fn format_load_test(&self, load: &LoadTestReport) -> String;

    /// Format an error line
    fn format_error(&self, message: &str) -> String;

    /// Format a success line
    fn format_success(&self, message: &str) -> String;

    /// Format the complete report
    fn format_report(&self, report: &BenchmarkReport) -> String {
        let mut out = String::new();
        out.push_str(&self.format_header(&report.image));
        out.push('\n');
        out.push_str(&self.format_environment(report));
        out.push('\n');
        out.push_str(&self.format_load_test(&report.load_test));
        out
    }
}

fn startup_time_display(startup_time_s: f64) -> String {
    if startup_time_s >= 0.0 {
        format!("{:.3}s", startup_time_s)
    } else {
        "unknown".to_string()
    }
}

/// Plain text formatter without ANSI sequences
#[derive(Debug, Clone, Default)]
pub struct PlainFormatter;

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, image: &str) -> String {
        format!("=== Benchmarking {} ===\n", image)
    }

    fn format_environment(&self, report: &BenchmarkReport) -> String {
        format!(
            "Startup Time:  {}\nIdle Memory:   {:.2} MB\nLoaded Memory: {:.2} MB\n",
            startup_time_display(report.startup_time_s),
            report.memory_idle_mb,
            report.memory_loaded_mb,
        )
    }

    fn format_load_test(&self, load: &LoadTestReport) -> String {
        format!(
            "Load Test Results:\n  \
             Requests:    {} ok, {} failed ({:.1}% success)\n  \
             Duration:    {:.2}s\n  \
             Throughput:  {:.1} req/s\n  \
             Latency:     avg {:.1}ms | min {:.1}ms | max {:.1}ms\n  \
             Percentiles: p95 {:.1}ms | p99 {:.1}ms\n",
            load.total_requests,
            load.errors,
            load.success_rate(),
            load.total_time_sec,
            load.throughput_rps,
            load.avg_latency_ms,
            load.min_latency_ms,
            load.max_latency_ms,
            load.p95_latency_ms,
            load.p99_latency_ms,
        )
    }

    fn format_error(&self, message: &str) -> String {
        format!("ERROR: {}", message)
    }

    fn format_success(&self, message: &str) -> String {
        format!("OK: {}", message)
    }
}

/// Colored formatter for interactive terminals
#[derive(Debug, Clone, Default)]
pub struct ColoredFormatter;

impl ColoredFormatter {
    /// Color a latency value by how responsive it is
    fn colorize_latency(latency_ms: f64) -> String {
        let text = format!("{:.1}ms", latency_ms);
        if latency_ms < 50.0 {
            text.green().to_string()
        } else if latency_ms < 300.0 {
            text.yellow().to_string()
        } else {
            text.red().to_string()
        }
    }

    fn colorize_success_rate(rate: f64) -> String {
        let text = format!("{:.1}%", rate);
        if rate >= 99.0 {
            text.green().to_string()
        } else if rate >= 90.0 {
            text.yellow().to_string()
        } else {
            text.red().to_string()
        }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, image: &str) -> String {
        format!("=== Benchmarking {} ===\n", image.bold())
    }

    fn format_environment(&self, report: &BenchmarkReport) -> String {
        format!(
            "Startup Time:  {}\nIdle Memory:   {} MB\nLoaded Memory: {} MB\n",
            startup_time_display(report.startup_time_s).cyan(),
            format!("{:.2}", report.memory_idle_mb).cyan(),
            format!("{:.2}", report.memory_loaded_mb).cyan(),
        )
    }

    fn format_load_test(&self, load: &LoadTestReport) -> String {
        format!(
            "{}\n  \
             Requests:    {} ok, {} failed ({} success)\n  \
             Duration:    {:.2}s\n  \
             Throughput:  {} req/s\n  \
             Latency:     avg {} | min {} | max {}\n  \
             Percentiles: p95 {} | p99 {}\n",
            "Load Test Results:".bold(),
            load.total_requests.to_string().green(),
            load.errors.to_string().red(),
            Self::colorize_success_rate(load.success_rate()),
            load.total_time_sec,
            format!("{:.1}", load.throughput_rps).bold(),
            Self::colorize_latency(load.avg_latency_ms),
            Self::colorize_latency(load.min_latency_ms),
            Self::colorize_latency(load.max_latency_ms),
            Self::colorize_latency(load.p95_latency_ms),
            Self::colorize_latency(load.p99_latency_ms),
        )
    }

    fn format_error(&self, message: &str) -> String {
        format!("{} {}", "ERROR:".red().bold(), message.red())
    }

    fn format_success(&self, message: &str) -> String {
        format!("{} {}", "OK:".green().bold(), message)
    }
}

/// Factory for creating the appropriate formatter
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on the color configuration
    pub fn create_formatter(enable_color: bool) -> Box<dyn OutputFormatter> {
        if enable_color {
            Box::new(ColoredFormatter)
        } else {
            Box::new(PlainFormatter)
        }
    }
}

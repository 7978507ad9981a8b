// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::anim::{AnimClip, ImportPlan};
use crate::document::Metadata;
use crate::shapes::TransferReport;
use colored::*;
use std::path::Path;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a written project or document
    pub fn report_document(path: &Path, payload: &str, metadata: &Metadata, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Wrote:".bold(), path.display().to_string().cyan());
        println!("{}", "━".repeat(80).bright_black());
        println!("  {} {}", "Payload:".bright_black(), payload.cyan());
        println!("\n{}", "transfer_data:".bold());
        if metadata.is_empty() {
            println!("  {}", "(none)".bright_black());
        }
        for attr in metadata.iter() {
            println!("  {}", attr.render());
        }
        println!(
            "\n  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report a loaded animation clip
    pub fn report_clip(file: &str, clip: &AnimClip) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Clip:".bold(), clip.clip_name.cyan());
        println!("{}", "━".repeat(80).bright_black());
        println!("  {} {}", "Source:".bright_black(), file);
        println!(
            "  {} {}",
            "Shapes:".bright_black(),
            clip.shapes.len().to_string().cyan()
        );
        println!(
            "  {} {}",
            "Frames:".bright_black(),
            clip.num_frames.to_string().cyan()
        );
        println!(
            "  {} {} fps ({:.2}s)",
            "Rate:".bright_black(),
            clip.frame_rate.to_string().yellow(),
            clip.duration_seconds()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report an import plan
    pub fn report_plan(plan: &ImportPlan) {
        println!("\n{}", "Import plan:".bold());
        let action_state = if plan.create_action { "new" } else { "existing" };
        println!(
            "  {} {} ({})",
            "Action:".bright_black(),
            plan.action_name.cyan(),
            action_state
        );
        for track in &plan.remove_tracks {
            println!("  {} {}", "Remove track:".bright_black(), track.red());
        }
        println!(
            "  {} {}",
            "Curves replaced:".bright_black(),
            plan.remove_curves.len()
        );
        println!(
            "  {} {} curves, {} keys",
            "Keys:".bright_black(),
            plan.curves.len(),
            plan.key_count()
        );
        if let Some(last) = plan.last_frame() {
            println!("  {} {:.2}", "Last frame:".bright_black(), last);
        }
        if let Some(strip) = &plan.strip {
            println!(
                "  {} {} @ {} (scale {:.3})",
                "Strip:".bright_black(),
                strip.track_name.cyan(),
                strip.frame_start,
                strip.scale
            );
        }
    }

    /// Report a shape transfer
    pub fn report_transfer(report: &TransferReport) {
        let plural = |n: usize| if n == 1 { "" } else { "s" };
        println!(
            "{} Cleaned {} shape{}",
            "ℹ️".bright_blue(),
            report.cleaned,
            plural(report.cleaned)
        );
        println!(
            "{} Transferred {} shape{}",
            "✅".green(),
            report.transferred,
            plural(report.transferred)
        );
        if !report.untouched.is_empty() {
            Self::report_warning(&format!(
                "{} target vertices are not covered by the mapping and keep the basis position",
                report.untouched.len()
            ));
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }

    /// Print success message
    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }
}

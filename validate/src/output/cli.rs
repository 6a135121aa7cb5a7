//! Colored CLI output for scenario runs
//!
//! Formats engine signals, cast rejections and checkpoint results with a
//! sim-time stamp and colors for easy visual parsing.

use std::io::{self, Write};

use cadence_core::{CastRejection, CombatSignal, StopReason, format_sim_time};

use crate::verification::{CheckpointResult, VerificationResult};

/// Output verbosity level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum OutputLevel {
    /// Only show summary at end
    Quiet,
    /// Show lifecycle signals and checkpoints (default)
    #[default]
    Normal,
    /// Also show ticks and every step
    Verbose,
}

/// CLI output formatter with color support
#[derive(Debug)]
pub struct CliOutput {
    level: OutputLevel,
    use_colors: bool,
    casts_completed: u32,
    casts_rejected: u32,
    channels_started: u32,
    channels_stopped: u32,
    channels_exhausted: u32,
    pulses: u32,
    effects_expired: u32,
    triggers: u32,
}

impl Default for CliOutput {
    fn default() -> Self {
        Self::new(OutputLevel::Normal, true)
    }
}

impl CliOutput {
    /// Colors are used only when allowed and stdout is a terminal
    pub fn new(level: OutputLevel, allow_colors: bool) -> Self {
        Self {
            level,
            use_colors: allow_colors && atty::is(atty::Stream::Stdout),
            casts_completed: 0,
            casts_rejected: 0,
            channels_started: 0,
            channels_stopped: 0,
            channels_exhausted: 0,
            pulses: 0,
            effects_expired: 0,
            triggers: 0,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ANSI Color Codes
    // ═══════════════════════════════════════════════════════════════════════════

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.paint("32", text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint("33", text)
    }

    fn red(&self, text: &str) -> String {
        self.paint("31", text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint("36", text)
    }

    fn magenta(&self, text: &str) -> String {
        self.paint("35", text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Event Output
    // ═══════════════════════════════════════════════════════════════════════════

    /// Scenario banner
    pub fn header(&self, name: &str, description: Option<&str>, steps: usize, checkpoints: usize) {
        if self.level < OutputLevel::Normal {
            return;
        }
        println!("{}", self.bold(&format!("═══ {} ═══", name)));
        if let Some(description) = description {
            println!("{}", self.dim(description));
        }
        println!("{} steps, {} checkpoints\n", steps, checkpoints);
    }

    /// Format one signal as a report line, or None if it is not shown at
    /// this verbosity
    pub fn format_signal(&self, now_ms: u64, signal: &CombatSignal) -> Option<String> {
        let body = match signal {
            CombatSignal::Tick { dt_ms, .. } => {
                if self.level < OutputLevel::Verbose {
                    return None;
                }
                format!("{} +{}ms", self.dim("TICK"), dt_ms)
            }
            CombatSignal::CastComplete {
                caster_id,
                ability_id,
                target_ids,
            } => {
                let targets = if target_ids.is_empty() {
                    String::new()
                } else {
                    format!(" → {}", target_ids.join(", "))
                };
                format!(
                    "{} {} \"{}\"{}",
                    self.green("-->"),
                    self.green("CAST COMPLETE:"),
                    ability_id,
                    targets
                ) + &self.dim(&format!(" [{}]", caster_id))
            }
            CombatSignal::ChannelStart { source_id, channel_id } => format!(
                "{} {} {} {}",
                self.cyan(">>>"),
                self.cyan("CHANNEL START:"),
                channel_id,
                self.dim(&format!("[{}]", source_id))
            ),
            CombatSignal::ChannelStop {
                source_id,
                channel_id,
                reason,
            } => {
                let (marker, label) = match reason {
                    StopReason::Manual => (self.yellow("<<<"), self.yellow("CHANNEL STOP:")),
                    StopReason::Exhausted => (self.red("!!!"), self.red("CHANNEL EXHAUSTED:")),
                };
                format!("{} {} {} {}", marker, label, channel_id, self.dim(&format!("[{}]", source_id)))
            }
            CombatSignal::EffectPulse { owner_id, effect_id, tag } => format!(
                "{} {} {}{} {}",
                self.magenta("~~~"),
                self.magenta("PULSE:"),
                effect_id,
                tag.as_ref().map(|t| format!(" ({})", t)).unwrap_or_default(),
                self.dim(&format!("[{}]", owner_id))
            ),
            CombatSignal::EffectExpired { owner_id, effect_id } => format!(
                "{} {} {} {}",
                self.dim("x--"),
                self.dim("EXPIRED:"),
                effect_id,
                self.dim(&format!("[{}]", owner_id))
            ),
            external => format!("{} {} {:?}", self.bold("***"), self.bold("TRIGGER:"), external),
        };
        Some(format!("[{}] {}", format_sim_time(now_ms), body))
    }

    /// Log one engine signal and count it for the summary
    pub fn signal(&mut self, now_ms: u64, signal: &CombatSignal) {
        match signal {
            CombatSignal::CastComplete { .. } => self.casts_completed += 1,
            CombatSignal::ChannelStart { .. } => self.channels_started += 1,
            CombatSignal::ChannelStop { reason, .. } => {
                self.channels_stopped += 1;
                if *reason == StopReason::Exhausted {
                    self.channels_exhausted += 1;
                }
            }
            CombatSignal::EffectPulse { .. } => self.pulses += 1,
            CombatSignal::EffectExpired { .. } => self.effects_expired += 1,
            CombatSignal::Tick { .. } => {}
            _ => self.triggers += 1,
        }
        if self.level < OutputLevel::Normal {
            return;
        }
        if let Some(line) = self.format_signal(now_ms, signal) {
            println!("{}", line);
        }
    }

    /// Log a cast rejection; `expected` rejections are shown dimmed
    pub fn rejection(&mut self, now_ms: u64, ability_id: &str, rejection: &CastRejection, expected: bool) {
        self.casts_rejected += 1;
        if self.level < OutputLevel::Normal {
            return;
        }
        let label = if expected {
            self.dim("REJECTED (expected):")
        } else {
            self.red("REJECTED:")
        };
        println!(
            "[{}] {} {} \"{}\" {}",
            format_sim_time(now_ms),
            self.red("xxx"),
            label,
            ability_id,
            rejection
        );
    }

    /// Log a scenario step (verbose only)
    pub fn step(&self, now_ms: u64, index: usize, kind: &str) {
        if self.level < OutputLevel::Verbose {
            return;
        }
        println!(
            "[{}] {} {}",
            format_sim_time(now_ms),
            self.dim(&format!("STEP {}:", index + 1)),
            kind
        );
    }

    pub fn checkpoint(&self, result: &CheckpointResult) {
        if self.level < OutputLevel::Normal && result.passed {
            return;
        }
        let name = result
            .name
            .clone()
            .unwrap_or_else(|| format!("#{}", result.checkpoint_idx + 1));
        let status = if result.passed {
            self.green("PASS")
        } else {
            self.red("FAIL")
        };
        println!(
            "[{}] {} {} {}",
            format_sim_time(result.at_ms),
            self.bold("CHECKPOINT"),
            name,
            status
        );
        for failure in &result.failures {
            println!("    └─ {}", failure);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Summary Report
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn print_summary(&self, end_ms: u64, verification: &VerificationResult, unexpected_rejections: u32) {
        let line = "═".repeat(51);
        println!();
        println!("{}", line);
        println!("  SCENARIO SUMMARY ({})", format_sim_time(end_ms));
        println!("{}", line);
        println!("Casts Completed:   {}", self.casts_completed);
        println!("Casts Rejected:    {}", self.casts_rejected);
        println!("Channels Started:  {}", self.channels_started);
        println!(
            "Channels Stopped:  {} ({} exhausted)",
            self.channels_stopped, self.channels_exhausted
        );
        println!("Effect Pulses:     {}", self.pulses);
        println!("Effects Expired:   {}", self.effects_expired);
        println!("Combat Triggers:   {}", self.triggers);
        if unexpected_rejections > 0 {
            println!(
                "Strict Mode:       {}",
                self.red(&format!("{} unexpected rejections", unexpected_rejections))
            );
        }

        let (passed, total) = (verification.checkpoints_passed, verification.checkpoints_total);
        let status = if verification.passed() {
            self.green(&format!("PASSED ({}/{})", passed, total))
        } else {
            self.red(&format!("FAILED ({}/{})", passed, total))
        };
        println!("Verification:      {}", status);
        for failed in verification.results.iter().filter(|r| !r.passed) {
            let name = failed.name.as_deref().unwrap_or("unnamed");
            println!(
                "  {} {} at {}",
                self.red("✗"),
                name,
                format_sim_time(failed.at_ms)
            );
        }
        println!("{}", line);
    }

    /// Flush stdout
    pub fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(level: OutputLevel) -> CliOutput {
        CliOutput::new(level, false)
    }

    #[test]
    fn test_signal_lines_are_stamped() {
        let output = plain(OutputLevel::Normal);
        let line = output
            .format_signal(
                65_250,
                &CombatSignal::ChannelStop {
                    source_id: "bard".into(),
                    channel_id: "song:1".into(),
                    reason: StopReason::Exhausted,
                },
            )
            .unwrap();
        assert_eq!(line, "[01:05.250] !!! CHANNEL EXHAUSTED: song:1 [bard]");
    }

    #[test]
    fn test_ticks_only_in_verbose() {
        let tick = CombatSignal::Tick { dt_ms: 16, now_ms: 16 };
        assert!(plain(OutputLevel::Normal).format_signal(16, &tick).is_none());
        assert!(plain(OutputLevel::Verbose).format_signal(16, &tick).is_some());
    }

    #[test]
    fn test_quiet_still_counts() {
        let mut output = plain(OutputLevel::Quiet);
        output.signal(
            0,
            &CombatSignal::ChannelStop {
                source_id: "a".into(),
                channel_id: "c".into(),
                reason: StopReason::Exhausted,
            },
        );
        output.signal(
            0,
            &CombatSignal::AllyKill {
                source_id: "a".into(),
                target_id: "b".into(),
            },
        );
        assert_eq!(output.channels_stopped, 1);
        assert_eq!(output.channels_exhausted, 1);
        assert_eq!(output.triggers, 1);
    }
}

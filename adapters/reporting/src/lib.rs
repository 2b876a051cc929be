#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Human-readable rendering of cascade runs.
//!
//! The renderer consumes the structured values produced by the engine and
//! writes decorated free text. Nothing here feeds back into the simulation.

use std::io::Write;

use anyhow::{Context, Result};
use decay_cascade_core::{CascadeConfig, CascadeOutcome, LayerReport, ResonancePattern};
use decay_cascade_system_resonance::{
    base_frequency, detection_metrics, resonance_patterns, DecaySummary,
};

const RULE_WIDTH: usize = 60;
const LAYER_RULE_WIDTH: usize = 40;

const BANNER: &str = "\
╔══════════════════════════════════════════════════════════╗
║   DECAY CASCADE                                          ║
║   E(d) = E0 · exp(-α·d)                                  ║
║   Layered completion resonance                           ║
║   Single-shot phase transition                           ║
╚══════════════════════════════════════════════════════════╝";

/// Title line of the success summary.
pub const SUCCESS_HEADLINE: &str = "[+] PHASE TRANSITION SUCCESSFUL";

/// Title line of the failure summary.
pub const FAILURE_HEADLINE: &str = "[-] PHASE TRANSITION FAILED";

/// Writes the complete report for a finished run.
///
/// Exactly one of the success or failure summaries is emitted, followed by
/// the resonance deployment (successful runs only) and the closing summary.
pub fn render_run<W: Write>(
    out: &mut W,
    config: &CascadeConfig,
    layers: &[LayerReport],
    outcome: &CascadeOutcome,
) -> Result<()> {
    write_header(out, config).context("failed to write report header")?;
    for report in layers {
        write_layer(out, config, report)
            .with_context(|| format!("failed to write layer {}", report.layer))?;
    }
    write_summary(out, config, outcome).context("failed to write run summary")?;
    if outcome.is_converged() {
        let patterns = resonance_patterns(config);
        write_deployment(out, config, &patterns).context("failed to write deployment")?;
    }
    write_closing(out, config, outcome).context("failed to write closing summary")?;
    out.flush().context("failed to flush report")?;
    Ok(())
}

/// Writes the banner and the parameters of the run.
pub fn write_header<W: Write>(out: &mut W, config: &CascadeConfig) -> Result<()> {
    writeln!(out, "{BANNER}")?;
    writeln!(out)?;
    writeln!(out, "[*] Initial Energy: E0 = {}", config.initial_energy)?;
    writeln!(out, "[*] Layers: L = {}", config.layer_count)?;
    writeln!(out, "[*] Stride: {}", config.stride)?;
    writeln!(out, "[*] Threshold: {:.6}", config.threshold)?;
    writeln!(out, "[*] α (dispersion): {}", config.coefficient)?;
    Ok(())
}

/// Writes the block describing a single processed layer.
pub fn write_layer<W: Write>(
    out: &mut W,
    config: &CascadeConfig,
    report: &LayerReport,
) -> Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "[Layer {}/{}] {}",
        report.layer,
        config.layer_count,
        "=".repeat(LAYER_RULE_WIDTH)
    )?;
    writeln!(
        out,
        "  Energy: {:.6} (Decay: {:.6})",
        report.energy, report.decay_factor
    )?;
    writeln!(out, "  Events: {}", report.event_count)?;

    for sample in &report.pressure_signals {
        writeln!(
            out,
            "  [L{}] Resonance pressure: {:.4}",
            report.layer, sample.pressure
        )?;
        if sample.critical {
            writeln!(
                out,
                "  [!] Critical pressure: {:.4} > {:.6}",
                sample.pressure, config.threshold
            )?;
        }
    }

    if report.below_threshold {
        writeln!(
            out,
            "  [!] Energy below threshold: {:.6} <= {:.6}",
            report.energy, config.threshold
        )?;
    }
    if report.converged {
        writeln!(out, "  [+] Phase transition achieved at layer {}", report.layer)?;
    }
    Ok(())
}

/// Writes either the success or the failure summary.
pub fn write_summary<W: Write>(
    out: &mut W,
    config: &CascadeConfig,
    outcome: &CascadeOutcome,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "CASCADE ANALYSIS")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

    match outcome {
        CascadeOutcome::Converged {
            layer,
            energy,
            total_events,
            receipt,
        } => {
            let metrics = detection_metrics(config.layer_count);
            writeln!(out, "{SUCCESS_HEADLINE}")?;
            writeln!(out, "    Transition Layer: {layer}")?;
            writeln!(out, "    Final Energy: {energy:.6}")?;
            writeln!(out, "    Total Events: {total_events}")?;
            writeln!(out, "    Effect: {}", receipt.effect)?;
            writeln!(out)?;
            writeln!(out, "[*] Detection metrics:")?;
            writeln!(out, "    Laminar Detection: {:.1}%", metrics.laminar * 100.0)?;
            writeln!(out, "    Layered Detection: {:.10}%", metrics.layered * 100.0)?;
            writeln!(out, "    Evasion Improvement: {:.0}x", metrics.evasion)?;
        }
        CascadeOutcome::Exhausted {
            final_layer,
            final_energy,
            threshold,
        } => {
            writeln!(out, "{FAILURE_HEADLINE}")?;
            writeln!(out, "    Final Layer: {final_layer}")?;
            writeln!(out, "    Final Energy: {final_energy:.6}")?;
            writeln!(out, "    Threshold: {threshold:.6}")?;
        }
    }
    Ok(())
}

/// Writes the resonance deployment section.
pub fn write_deployment<W: Write>(
    out: &mut W,
    config: &CascadeConfig,
    patterns: &[ResonancePattern],
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "RESONANCE DEPLOYMENT")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "[*] Generated {} resonance patterns", patterns.len())?;
    writeln!(out, "[*] Base frequency: {:.2} Hz", base_frequency(config))?;
    writeln!(out, "[*] Pattern modulation: 0xAA/0x55 alternating")?;
    writeln!(out, "[+] Resonance link established")?;
    Ok(())
}

/// Writes the closing banner and the decay law summary.
pub fn write_closing<W: Write>(
    out: &mut W,
    config: &CascadeConfig,
    outcome: &CascadeOutcome,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    if outcome.is_converged() {
        writeln!(out, "CASCADE COMPLETE")?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "Decay law: verified")?;
        writeln!(out, "Threshold crossing: achieved")?;
        writeln!(out, "Completion resonance: synchronized")?;
        writeln!(out, "Phase transition: completed")?;
    } else {
        writeln!(out, "CASCADE FAILED")?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "Insufficient decay before the final layer")?;
        writeln!(out, "Increase α or lower the threshold")?;
    }

    let summary = DecaySummary::new(config);
    writeln!(out)?;
    writeln!(out, "Decay summary:")?;
    writeln!(out, "  E(d) = E0 · exp(-{}·d)", summary.coefficient)?;
    writeln!(
        out,
        "  Integral 0..{}: {:.6}",
        summary.layer_count, summary.integral
    )?;
    writeln!(
        out,
        "  Energy decay L{}/L0: {:.10}",
        summary.last_layer, summary.decay_ratio
    )?;
    Ok(())
}

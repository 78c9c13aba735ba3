//! Findings reporting
//!
//! Builds the context handed to the narrative summarizer and renders a
//! plain markdown findings document for terminal or file output. The
//! markdown path needs no provider and always works.

use crate::model::AnalysisState;
use crate::pipeline::aggregate;
use crate::providers::SummaryContext;

/// One prompt-friendly line per signal
fn signal_lines(state: &AnalysisState) -> Vec<String> {
    state
        .risk_signals
        .iter()
        .map(|signal| {
            format!(
                "- {} ({}): {} [Score: {:.2}]",
                signal.signal_type.as_str(),
                signal.severity.as_str(),
                signal.description,
                signal.score
            )
        })
        .collect()
}

/// Context for the summarizer provider
pub fn build_summary_context(state: &AnalysisState) -> SummaryContext {
    SummaryContext {
        tender_id: state.tender_id.clone(),
        tender_description: state.tender_description.clone(),
        bidder_count: state.bidders.len(),
        overall_risk_score: state.overall_risk_score,
        signal_lines: signal_lines(state),
    }
}

/// Markdown findings document for a finished (or halted) run
pub fn render_findings_markdown(state: &AnalysisState) -> String {
    let mut markdown = String::new();

    markdown.push_str(&format!("# Tender Risk Findings: {}\n\n", state.tender_id));
    markdown.push_str(&format!(
        "- Bidders analyzed: {}\n- Pipeline step: {}\n- Overall risk score: {:.2}\n",
        state.bidders.len(),
        state.current_step,
        state.overall_risk_score
    ));
    if let Some(error) = &state.error {
        markdown.push_str(&format!("- Error: {}\n", error));
    }
    markdown.push('\n');

    markdown.push_str("## Risk Signals\n\n");
    if state.risk_signals.is_empty() {
        markdown.push_str("No significant risks detected.\n\n");
    } else {
        for line in signal_lines(state) {
            markdown.push_str(&line);
            markdown.push('\n');
        }
        markdown.push('\n');

        let counts = aggregate::severity_counts(&state.risk_signals);
        markdown.push_str("## Severity Breakdown\n\n");
        markdown.push_str(&format!(
            "| High | Medium | Low |\n|---|---|---|\n| {} | {} | {} |\n\n",
            counts.high, counts.medium, counts.low
        ));
    }

    if let Some(network) = &state.relationship_graph {
        markdown.push_str("## Bidder Network\n\n");
        markdown.push_str(&format!(
            "- Relationships: {}\n- Network density: {:.2}\n- High-risk groups: {}\n\n",
            network.num_relationships,
            network.network_density,
            network.high_risk_groups.len()
        ));
    }

    if let Some(summary) = &state.summary {
        markdown.push_str("## Narrative Summary\n\n");
        markdown.push_str(summary);
        markdown.push('\n');
    }

    markdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalysisRequest, RiskSignal, Severity, SignalType};

    fn state_with_signal() -> AnalysisState {
        let mut state = AnalysisState::initialized(AnalysisRequest {
            tender_id: "T-42".to_string(),
            tender_description: "bridge repair".to_string(),
            bidders: vec![],
            documents: vec![],
        });
        state.risk_signals.push(RiskSignal::new(
            SignalType::PriceAnomaly,
            Severity::Medium,
            0.5,
            "Price analysis detected 2 risk indicators",
            serde_json::Value::Null,
            vec!["b1".to_string(), "b2".to_string()],
        ));
        state.overall_risk_score = 0.5;
        state
    }

    #[test]
    fn test_summary_context_lines() {
        let context = build_summary_context(&state_with_signal());
        assert_eq!(context.tender_id, "T-42");
        assert_eq!(context.signal_lines.len(), 1);
        assert_eq!(
            context.signal_lines[0],
            "- price_anomaly (medium): Price analysis detected 2 risk indicators [Score: 0.50]"
        );
    }

    #[test]
    fn test_markdown_contains_signals_and_counts() {
        let markdown = render_findings_markdown(&state_with_signal());
        assert!(markdown.contains("# Tender Risk Findings: T-42"));
        assert!(markdown.contains("price_anomaly (medium)"));
        assert!(markdown.contains("| 0 | 1 | 0 |"));
    }

    #[test]
    fn test_markdown_without_signals_says_so() {
        let state = AnalysisState::initialized(AnalysisRequest {
            tender_id: "T-0".to_string(),
            tender_description: String::new(),
            bidders: vec![],
            documents: vec![],
        });
        let markdown = render_findings_markdown(&state);
        assert!(markdown.contains("No significant risks detected."));
    }
}

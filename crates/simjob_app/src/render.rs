use crate::board::{JobRowView, Outcome};

pub const BAR_WIDTH: usize = 30;

pub fn render_row(row: &JobRowView) -> String {
    let filled = usize::from(row.percent) * BAR_WIDTH / 100;
    let bar = format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled));
    let status = match &row.outcome {
        None => row.stage.clone().unwrap_or_default(),
        Some(Outcome::Completed) => "done".to_string(),
        Some(Outcome::Cancelled) => "cancelled".to_string(),
        Some(Outcome::Failed(message)) => format!("failed: {message}"),
    };
    let mut line = format!(
        "#{:<3} {:<28} [{}] {:>3}% {}",
        row.job_id, row.name, bar, row.percent, status
    );
    if let Some(log) = row.last_log.as_deref() {
        line.push_str(" | ");
        line.push_str(log);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(percent: u8, outcome: Option<Outcome>) -> JobRowView {
        JobRowView {
            job_id: 7,
            name: "Collection builder".to_string(),
            percent,
            stage: Some("Drafting collections".to_string()),
            last_log: None,
            outcome,
        }
    }

    #[test]
    fn bar_fill_tracks_percent() {
        let half = render_row(&row(50, None));
        assert!(half.contains(&format!("[{}{}]", "#".repeat(15), ".".repeat(15))));
        assert!(half.ends_with(" 50% Drafting collections"));

        let full = render_row(&row(100, Some(Outcome::Completed)));
        assert!(full.contains(&format!("[{}]", "#".repeat(BAR_WIDTH))));
        assert!(full.ends_with("100% done"));
    }

    #[test]
    fn last_log_and_failure_are_shown() {
        let mut failed = row(12, Some(Outcome::Failed("boom".to_string())));
        failed.last_log = Some("Process started".to_string());
        let line = render_row(&failed);
        assert!(line.starts_with("#7   Collection builder"));
        assert!(line.ends_with(" 12% failed: boom | Process started"));
    }
}

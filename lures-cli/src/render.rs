use lures_core::{DisplayRecord, RenderSink};

/// Renders the report to stdout, one line per field.
#[derive(Debug, Default)]
pub struct TerminalSink;

impl RenderSink for TerminalSink {
    fn render_report(&mut self, record: &DisplayRecord) {
        println!("{}", record.date);
        println!("{}", record.spot);
        println!("{}", record.temps);
        println!("{}", record.condition);
        println!("{}", record.lure);
    }

    fn render_notice(&mut self, notice: &str) {
        println!("{notice}");
    }
}

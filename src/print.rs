use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use tracing::debug;

use crate::config::{AppConfig, EmbedKind, MiniApp};
use crate::error::{AppError, Result};
use crate::model::InvoiceDraft;
use crate::view::{InvoiceView, or_placeholder, preview_table};

pub const EMPTY_STATE_TITLE: &str = "No invoice data found";
pub const EMPTY_STATE_HINT: &str = "Go back to create an invoice, then use the Print PDF button.";
pub const ISSUED_BY_PLACEHOLDER: &str = "Your business";
pub const DUE_DATE_PLACEHOLDER: &str = "—";
pub const OUTPUT_FILE: &str = "invoice-print.html";

// Embed templates at compile time so printing works without any setup
const HEAD_TEMPLATE: &str = include_str!("../templates/head.html");
const PRINT_TEMPLATE: &str = include_str!("../templates/print.html");
const EMPTY_TEMPLATE: &str = include_str!("../templates/empty.html");

/// Header lines only the print layout carries.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct PrintHeader {
    pub issued_by: String,
    pub due_date: String,
}

impl PrintHeader {
    pub fn project(draft: &InvoiceDraft) -> Self {
        PrintHeader {
            issued_by: or_placeholder(&draft.from, ISSUED_BY_PLACEHOLDER),
            due_date: or_placeholder(&draft.deadline, DUE_DATE_PLACEHOLDER),
        }
    }
}

#[derive(Serialize)]
struct MetaEmbed {
    name: &'static str,
    content: String,
}

#[derive(Serialize)]
struct PrintContext<'a> {
    page_title: &'a str,
    share: &'a MiniApp,
    embeds: Vec<MetaEmbed>,
    header: Option<PrintHeader>,
    view: Option<InvoiceView>,
}

/// Built-in pages, with any same-named `*.html` from `template_dir` taking precedence.
fn load_templates(template_dir: Option<&Path>) -> Result<Tera> {
    let mut builtin = Tera::default();
    builtin.add_raw_templates(vec![
        ("head.html", HEAD_TEMPLATE),
        ("print.html", PRINT_TEMPLATE),
        ("empty.html", EMPTY_TEMPLATE),
    ])?;

    let Some(dir) = template_dir.filter(|d| d.is_dir()) else {
        return Ok(builtin);
    };
    debug!(dir = %dir.display(), "loading template overrides");
    let glob = dir.join("*.html");
    let mut custom = Tera::new(&glob.to_string_lossy())?;
    custom.extend(&builtin)?;
    Ok(custom)
}

/// Renders the printable page, or its empty state when there is no draft.
pub fn render_print_page(draft: Option<&InvoiceDraft>, config: &AppConfig) -> Result<String> {
    let tera = load_templates(config.settings.template_path().as_deref())?;
    let locale = &config.settings.locale;

    let context_data = PrintContext {
        page_title: if draft.is_some() { "Invoice" } else { EMPTY_STATE_TITLE },
        share: &config.share.miniapp,
        embeds: [EmbedKind::MiniApp, EmbedKind::Frame]
            .into_iter()
            .map(|kind| MetaEmbed { name: kind.meta_name(), content: config.share.embed_json(kind) })
            .collect(),
        header: draft.map(PrintHeader::project),
        view: draft.map(|d| InvoiceView::project(d, locale)),
    };

    let context = Context::from_serialize(&context_data)?;
    let template = if draft.is_some() { "print.html" } else { "empty.html" };
    Ok(tera.render(template, &context)?)
}

/// Plain-text version of the print view for the terminal.
pub fn print_summary(draft: Option<&InvoiceDraft>, config: &AppConfig) -> String {
    match draft {
        None => format!("{EMPTY_STATE_TITLE}\n{EMPTY_STATE_HINT}\nRun `invoice-easy new` to get back to the form."),
        Some(d) => {
            let header = PrintHeader::project(d);
            let view = InvoiceView::project(d, &config.settings.locale);
            format!(
                "Invoice\nIssued by: {}\nDue Date: {}\n{}",
                header.issued_by,
                header.due_date,
                preview_table(&view)
            )
        }
    }
}

pub fn write_print_page(html: &str, output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).map_err(|e| AppError::io(output_dir, e))?;
    let path = output_dir.join(OUTPUT_FILE);
    fs::write(&path, html).map_err(|e| AppError::io(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::session::{MemorySessionStore, handoff, load};
    use tempfile::tempdir;

    fn crypto_draft() -> InvoiceDraft {
        InvoiceDraft {
            client: "Acme Corp.".into(),
            from: "Studio Nine".into(),
            description: "Audit\nReport".into(),
            amount: "1234.5".into(),
            currency: "usd".into(),
            deadline: "2026-11-30".into(),
            category: Category::Crypto,
            crypto_address: "0xabc".into(),
            blockchain_network: "Ethereum".into(),
            payment_link: "https://stale.example".into(),
        }
    }

    #[test]
    fn empty_state_when_nothing_was_handed_off() {
        let html = render_print_page(None, &AppConfig::default()).unwrap();
        assert!(html.contains(EMPTY_STATE_TITLE));
        assert!(html.contains("Back to form"));
        assert!(!html.contains("Amount Due"));
    }

    #[test]
    fn failed_handoff_leads_to_empty_state() {
        let store = MemorySessionStore::unavailable();
        handoff(&store, &crypto_draft());
        let loaded = load(&store);
        assert!(loaded.is_none());
        let html = render_print_page(loaded.as_ref(), &AppConfig::default()).unwrap();
        assert!(html.contains("No invoice data found"));
        assert!(print_summary(loaded.as_ref(), &AppConfig::default()).starts_with("No invoice data found"));
    }

    #[test]
    fn crypto_invoice_layout() {
        let html = render_print_page(Some(&crypto_draft()), &AppConfig::default()).unwrap();
        assert!(html.contains("Issued by: <strong>Studio Nine</strong>"));
        assert!(html.contains("2026-11-30"));
        assert!(html.contains("1,234.50 usd"));
        assert!(html.contains("0xabc"));
        assert!(html.contains("Ethereum"));
        assert!(!html.contains("Payment Link"));
        assert!(!html.contains("stale.example"));
        assert!(html.contains("Thank you for your business."));
    }

    #[test]
    fn general_invoice_layout_with_placeholders() {
        let draft = InvoiceDraft { payment_link: "https://pay.example/1".into(), ..Default::default() };
        let html = render_print_page(Some(&draft), &AppConfig::default()).unwrap();
        assert!(html.contains("Issued by: <strong>Your business</strong>"));
        assert!(html.contains("<p class=\"value\">—</p>"));
        assert!(html.contains("Client name or company"));
        assert!(html.contains("0.00"));
        assert!(html.contains("https:&#x2F;&#x2F;pay.example&#x2F;1"));
        assert!(!html.contains("Crypto Address"));
    }

    #[test]
    fn controls_are_hidden_when_printing() {
        let html = render_print_page(Some(&crypto_draft()), &AppConfig::default()).unwrap();
        assert!(html.contains("class=\"controls\""));
        assert!(html.contains("@media print"));
        assert!(html.contains(".controls { display: none; }"));
        assert!(html.contains("window.print()"));
    }

    #[test]
    fn user_text_is_escaped() {
        let draft = InvoiceDraft { client: "<script>x</script>".into(), ..Default::default() };
        let html = render_print_page(Some(&draft), &AppConfig::default()).unwrap();
        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn share_metadata_lands_in_head() {
        let html = render_print_page(None, &AppConfig::default()).unwrap();
        assert!(html.contains("name=\"fc:miniapp\""));
        assert!(html.contains("name=\"fc:frame\""));
        assert!(html.contains("launch_miniapp"));
        assert!(html.contains("og-image.png"));
    }

    #[test]
    fn template_dir_overrides_builtin_page() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("print.html"), "custom {{ view.billed_to }} {{ header.issued_by }}").unwrap();
        let mut config = AppConfig::default();
        config.settings.template_dir = Some(dir.path().to_string_lossy().to_string());

        let html = render_print_page(Some(&crypto_draft()), &config).unwrap();
        assert_eq!(html, "custom Acme Corp. Studio Nine");
        // empty state still comes from the built-in set
        assert!(render_print_page(None, &config).unwrap().contains(EMPTY_STATE_TITLE));
    }

    #[test]
    fn header_falls_back_per_field() {
        let header = PrintHeader::project(&InvoiceDraft { deadline: "2026-12-01".into(), ..Default::default() });
        assert_eq!(header.issued_by, ISSUED_BY_PLACEHOLDER);
        assert_eq!(header.due_date, "2026-12-01");
        let header = PrintHeader::project(&crypto_draft());
        assert_eq!(header, PrintHeader { issued_by: "Studio Nine".into(), due_date: "2026-11-30".into() });
    }

    #[test]
    fn summary_lists_invoice_lines() {
        let summary = print_summary(Some(&crypto_draft()), &AppConfig::default());
        assert!(summary.starts_with("Invoice\nIssued by: Studio Nine\nDue Date: 2026-11-30"));
        assert!(summary.contains("1,234.50 usd"));
    }

    #[test]
    fn writes_page_into_output_dir() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested");
        let path = write_print_page("<html></html>", &out).unwrap();
        assert_eq!(path, out.join(OUTPUT_FILE));
        assert_eq!(fs::read_to_string(path).unwrap(), "<html></html>");
    }
}

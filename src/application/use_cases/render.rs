//! Server-side HTML for the checklist page.
//!
//! Cards are always re-rendered as a whole; the page script swaps the
//! container's markup after every mutation.

use crate::application::use_cases::checklist_store::ChecklistStore;
use crate::domain::checklist::ChecklistSummary;
use crate::domain::test_case::{
    resolve_target_query, Evidence, Phase, ReportingTool, Status, TestCase, SOURCE_QUERY_LABEL,
};

pub const EMPTY_PLACEHOLDER: &str = "No test cases found. Add a new test case to get started.";
const NO_DESCRIPTION: &str = "No description provided.";
const NO_EVIDENCE: &str = "No evidence uploaded";

/// Escapes text for both element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_cards(store: &ChecklistStore) -> String {
    if store.is_empty() {
        return format!(
            r#"<p class="empty-placeholder" style="text-align: center; color: #999; padding: 40px;">{}</p>"#,
            EMPTY_PLACEHOLDER
        );
    }

    let tool = store.active_tool();
    store
        .test_cases()
        .iter()
        .enumerate()
        .map(|(index, test_case)| render_card(test_case, index, tool))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_card(test_case: &TestCase, index: usize, tool: ReportingTool) -> String {
    let target_query = resolve_target_query(test_case, tool);
    let mut html = format!(
        r#"<div class="test-case-card {phase} {status}" data-index="{index}">
  <div class="test-case-header">
    <span class="test-case-id">{id}</span>
    <h3 class="test-case-title">{title}</h3>
    <span class="validation-phase-badge {phase}">{icon} {label}</span>
  </div>
  <div class="test-case-description">{description}</div>
"#,
        phase = test_case.phase.as_str(),
        status = test_case.status.as_str(),
        index = index,
        id = escape_html(&test_case.id),
        title = escape_html(&test_case.title),
        icon = test_case.phase.icon(),
        label = test_case.phase.label(),
        description = if test_case.description.is_empty() {
            NO_DESCRIPTION.to_string()
        } else {
            escape_html(&test_case.description)
        },
    );

    if !test_case.source_query.is_empty() || !target_query.is_empty() {
        html.push_str("  <div class=\"test-case-queries\">\n");
        if !test_case.source_query.is_empty() {
            html.push_str(&render_query_box(
                &format!("\u{1F4CA} {}", SOURCE_QUERY_LABEL),
                &test_case.source_query,
                index,
                "source",
            ));
        }
        if !target_query.is_empty() {
            html.push_str(&render_query_box(
                &format!("\u{1F3AF} {}", tool.target_query_label()),
                target_query,
                index,
                "target",
            ));
        }
        html.push_str("  </div>\n");
    }

    if !test_case.expected_result.is_empty() {
        html.push_str(&format!(
            r#"  <div class="expected-result"><strong>Expected Result:</strong> {}</div>
"#,
            escape_html(&test_case.expected_result)
        ));
    }

    html.push_str(&format!(
        r#"  <div class="test-case-actions">
    <div class="evidence-section">
      <div class="evidence-upload">
        <input type="file" id="evidence-{index}" accept="image/*,.pdf,.doc,.docx" multiple onchange="handleEvidenceUpload({index}, this)">
        <label for="evidence-{index}" class="evidence-label">&#x1F4CE; Upload Evidence</label>
      </div>
      <div class="evidence-list" id="evidence-list-{index}">{evidence}</div>
    </div>
    <div class="status-section">{status_buttons}</div>
    <div>
      <button class="btn-edit" onclick="editTestCase({index})">&#x270F;&#xFE0F; Edit</button>
      <button class="btn-delete" onclick="deleteTestCase({index})">&#x1F5D1;&#xFE0F; Delete</button>
    </div>
  </div>
</div>"#,
        index = index,
        evidence = render_evidence(&test_case.evidence, index),
        status_buttons = render_status_buttons(test_case.status, index),
    ));

    html
}

fn render_query_box(heading: &str, query: &str, index: usize, kind: &str) -> String {
    format!(
        r#"    <div class="query-box">
      <h4>{heading}</h4>
      <div class="query-content">{query}</div>
      <div class="query-actions">
        <button class="btn-small btn-copy" onclick="copyQuery({index}, '{kind}')">&#x1F4CB; Copy</button>
      </div>
    </div>
"#,
        heading = escape_html(heading),
        query = escape_html(query),
        index = index,
        kind = kind,
    )
}

fn render_evidence(evidence: &[Evidence], index: usize) -> String {
    if evidence.is_empty() {
        return format!(
            r#"<span class="evidence-empty" style="color: #999; font-size: 0.85rem;">{}</span>"#,
            NO_EVIDENCE
        );
    }

    evidence
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let preview = match (&file.url, file.is_image()) {
                (Some(url), true) => format!(
                    r#"<img src="{}" alt="{}">"#,
                    escape_html(url),
                    escape_html(&file.name)
                ),
                _ => "<span>&#x1F4C4;</span>".to_string(),
            };
            format!(
                r#"<div class="evidence-item">{preview}<span>{name}</span><span class="remove" onclick="removeEvidence({index}, {i})">&times;</span></div>"#,
                preview = preview,
                name = escape_html(&file.name),
                index = index,
                i = i,
            )
        })
        .collect()
}

fn render_status_buttons(current: Status, index: usize) -> String {
    Status::ALL
        .iter()
        .map(|status| {
            let active = if *status == current { " active" } else { "" };
            format!(
                r#"<button class="status-btn {current}{active}" data-status="{value}" onclick="changeStatus({index}, '{value}')">{icon} {label}</button>"#,
                current = current.as_str(),
                active = active,
                value = status.as_str(),
                index = index,
                icon = status.icon(),
                label = status.label(),
            )
        })
        .collect()
}

pub fn render_summary(summary: &ChecklistSummary) -> String {
    format!(
        r#"<div class="summary-grid">
  <div class="summary-item"><span class="summary-value" id="total-tests">{total}</span><span class="summary-label">Total</span></div>
  <div class="summary-item passed"><span class="summary-value" id="passed-tests">{passed}</span><span class="summary-label">Passed</span></div>
  <div class="summary-item failed"><span class="summary-value" id="failed-tests">{failed}</span><span class="summary-label">Failed</span></div>
  <div class="summary-item pending"><span class="summary-value" id="pending-tests">{pending}</span><span class="summary-label">Pending</span></div>
  <div class="summary-item"><span class="summary-value" id="completion-rate">{rate}%</span><span class="summary-label">Completion</span></div>
</div>"#,
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        pending = summary.pending,
        rate = summary.completion_rate,
    )
}

fn render_options<T: Copy + PartialEq>(
    values: &[T],
    selected: Option<T>,
    value_of: impl Fn(T) -> &'static str,
    label_of: impl Fn(T) -> String,
) -> String {
    values
        .iter()
        .map(|value| {
            let marker = if Some(*value) == selected {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                value_of(*value),
                marker,
                escape_html(&label_of(*value))
            )
        })
        .collect()
}

/// The whole page: header form, filter bar, summary, cards and script.
pub fn render_page(store: &ChecklistStore, report_name: &str) -> String {
    let tool = store.active_tool();
    let tool_options = render_options(
        &[ReportingTool::PowerBi, ReportingTool::Oac],
        Some(tool),
        |t| t.as_str(),
        |t| t.display_name().to_string(),
    );
    let phase_options = render_options(
        &Phase::ALL,
        None,
        |p| p.as_str(),
        |p| format!("{} {}", p.icon(), p.label()),
    );
    let status_options = render_options(&Status::ALL, None, |s| s.as_str(), |s| s.label().to_string());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Report Validation Checklist - {report_name}</title>
<style>{style}</style>
</head>
<body>
<div class="container">
  <header>
    <h1>Report Validation Checklist</h1>
    <h2>{report_name}</h2>
  </header>

  <section class="report-info">
    <label>Reporting Tool
      <select id="reporting-tool" onchange="saveReportInfo(true)">{tool_options}</select>
    </label>
    <label>Validation Date <input type="date" id="validation-date" value="{date}" onchange="saveReportInfo(false)"></label>
    <label>Validator <input type="text" id="validator-name" value="{validator}" onchange="saveReportInfo(false)"></label>
    <label class="wide">Report Description
      <textarea id="report-description" rows="3">{description}</textarea>
    </label>
    <button class="btn" onclick="saveReportDescription()">Save Description</button>
  </section>

  <section class="summary" id="summary">{summary}</section>

  <section class="toolbar">
    <button class="btn" onclick="toggleAddForm()">&#x2795; Add Test Case</button>
    <button class="btn" onclick="exportChecklist()">&#x1F4BE; Export JSON</button>
    <button class="btn" onclick="exportToPDF()">&#x1F4C4; Export PDF</button>
    <button class="btn" onclick="window.print()">&#x1F5A8;&#xFE0F; Print</button>
  </section>

  <section id="add-form" style="display: none;">
    <form id="test-case-form">
      <input type="text" id="test-case-id" placeholder="{next_id}" required>
      <input type="text" id="test-case-title" placeholder="Title" required>
      <select id="validation-phase">{phase_options}</select>
      <textarea id="test-case-description" placeholder="Description"></textarea>
      <textarea id="source-query" placeholder="Source query"></textarea>
      <textarea id="target-query" placeholder="Target query"></textarea>
      <textarea id="expected-result" placeholder="Expected result"></textarea>
      <button type="submit" class="btn">Save Test Case</button>
    </form>
  </section>

  <section class="filters">
    <select id="filter-phase" onchange="filterTestCases()"><option value="all">All Phases</option>{phase_options}</select>
    <select id="filter-status" onchange="filterTestCases()"><option value="all">All Statuses</option>{status_options}</select>
    <input type="text" id="search-test" placeholder="Search test cases..." oninput="filterTestCases()">
  </section>

  <div id="test-cases-container">{cards}</div>
</div>
<script>{script}</script>
</body>
</html>
"#,
        report_name = escape_html(report_name),
        style = PAGE_STYLE,
        tool_options = tool_options,
        date = store.meta().validation_date.format("%Y-%m-%d"),
        validator = escape_html(&store.meta().validator),
        description = escape_html(store.report_description()),
        summary = render_summary(&store.summary()),
        next_id = escape_html(&store.suggest_next_id()),
        phase_options = phase_options,
        status_options = status_options,
        cards = render_cards(store),
        script = PAGE_SCRIPT,
    )
}

const PAGE_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; background: #f4f6f9; margin: 0; color: #222; }
.container { max-width: 1100px; margin: 0 auto; padding: 24px; }
header h1 { color: #0066cc; margin-bottom: 4px; }
section { background: #fff; border-radius: 8px; padding: 16px; margin-bottom: 16px; }
.report-info label { display: inline-block; margin-right: 16px; }
.report-info label.wide { display: block; margin-top: 12px; }
.report-info textarea, #test-case-form textarea { width: 100%; }
.summary-grid { display: grid; grid-template-columns: repeat(5, 1fr); gap: 12px; text-align: center; }
.summary-value { display: block; font-size: 1.8rem; font-weight: bold; }
.summary-item.passed .summary-value { color: #00994c; }
.summary-item.failed .summary-value { color: #dc3545; }
.summary-item.pending .summary-value { color: #ffc107; }
.test-case-card { background: #fff; border-left: 5px solid #0066cc; border-radius: 8px; padding: 16px; margin-bottom: 16px; }
.test-case-card.passed { border-left-color: #00994c; }
.test-case-card.failed { border-left-color: #dc3545; }
.test-case-card.hidden { display: none; }
.test-case-header { display: flex; gap: 12px; align-items: center; }
.test-case-id { font-weight: bold; color: #0066cc; }
.validation-phase-badge { margin-left: auto; font-size: 0.8rem; background: #eef; padding: 4px 8px; border-radius: 12px; }
.query-box { background: #f8f9fa; border-radius: 6px; padding: 8px; margin: 8px 0; }
.query-content { font-family: "Courier New", monospace; white-space: pre-wrap; font-size: 0.8rem; }
.expected-result { background: #E3F2FD; padding: 15px; border-radius: 8px; margin-bottom: 15px; }
.evidence-item { display: inline-flex; gap: 6px; align-items: center; margin: 4px; }
.evidence-item img { max-width: 60px; max-height: 45px; }
.evidence-item .remove { cursor: pointer; color: #dc3545; }
.status-btn.active { outline: 2px solid #0066cc; font-weight: bold; }
.evidence-upload input[type=file] { display: none; }
.evidence-label { cursor: pointer; color: #0066cc; }
@media print { .toolbar, .filters, #add-form, .test-case-actions button { display: none; } }
"#;

const PAGE_SCRIPT: &str = r#"
let editingIndex = null;

async function api(method, url, body) {
  const options = { method, headers: {} };
  if (body !== undefined) {
    options.headers['Content-Type'] = 'application/json';
    options.body = JSON.stringify(body);
  }
  const res = await fetch(url, options);
  const text = await res.text();
  if (!res.ok) throw new Error(text || res.statusText);
  return text ? JSON.parse(text) : null;
}

async function renderTestCases() {
  const res = await fetch('/api/cards');
  document.getElementById('test-cases-container').innerHTML = await res.text();
}

function updateSummary(summary) {
  if (!summary) return;
  document.getElementById('total-tests').textContent = summary.total;
  document.getElementById('passed-tests').textContent = summary.passed;
  document.getElementById('failed-tests').textContent = summary.failed;
  document.getElementById('pending-tests').textContent = summary.pending;
  document.getElementById('completion-rate').textContent = summary.completionRate + '%';
}

async function refresh(result) {
  await renderTestCases();
  updateSummary(result && result.summary);
  if (result && result.nextId) {
    document.getElementById('test-case-id').placeholder = result.nextId;
  }
}

function toggleAddForm() {
  const form = document.getElementById('add-form');
  form.style.display = form.style.display === 'none' ? 'block' : 'none';
}

function formValues() {
  return {
    id: document.getElementById('test-case-id').value,
    title: document.getElementById('test-case-title').value,
    phase: document.getElementById('validation-phase').value,
    description: document.getElementById('test-case-description').value,
    sourceQuery: document.getElementById('source-query').value,
    targetQuery: document.getElementById('target-query').value,
    expectedResult: document.getElementById('expected-result').value,
  };
}

document.getElementById('test-case-form').addEventListener('submit', async (e) => {
  e.preventDefault();
  try {
    const result = editingIndex === null
      ? await api('POST', '/api/test-cases', formValues())
      : await api('PUT', '/api/test-cases/' + editingIndex, formValues());
    editingIndex = null;
    e.target.reset();
    toggleAddForm();
    await refresh(result);
    alert(result.message);
  } catch (err) {
    alert(err.message);
  }
});

async function editTestCase(index) {
  const values = await api('GET', '/api/test-cases/' + index + '/form');
  document.getElementById('test-case-id').value = values.id;
  document.getElementById('test-case-title').value = values.title;
  document.getElementById('validation-phase').value = values.phase;
  document.getElementById('test-case-description').value = values.description || '';
  document.getElementById('source-query').value = values.sourceQuery || '';
  document.getElementById('target-query').value = values.targetQuery || '';
  document.getElementById('expected-result').value = values.expectedResult || '';
  editingIndex = index;
  document.getElementById('add-form').style.display = 'block';
}

async function deleteTestCase(index) {
  const confirmed = confirm('Are you sure you want to delete this test case?');
  if (!confirmed) return;
  await refresh(await api('DELETE', '/api/test-cases/' + index + '?confirm=true'));
}

async function changeStatus(index, status) {
  await refresh(await api('PUT', '/api/test-cases/' + index + '/status', { status }));
}

function handleEvidenceUpload(index, input) {
  Array.from(input.files).forEach((file) => {
    const reader = new FileReader();
    reader.onload = async (e) => {
      try {
        await refresh(await api('POST', '/api/test-cases/' + index + '/evidence', {
          name: file.name,
          dataUrl: e.target.result,
        }));
      } catch (err) {
        alert('Could not upload ' + file.name + ': ' + err.message);
      }
    };
    reader.onerror = () => alert('Could not read ' + file.name);
    reader.readAsDataURL(file);
  });
  input.value = '';
}

async function removeEvidence(index, evidenceIndex) {
  await refresh(await api('DELETE', '/api/test-cases/' + index + '/evidence/' + evidenceIndex));
}

async function filterTestCases() {
  const cards = document.querySelectorAll('.test-case-card');
  const params = new URLSearchParams({
    phase: document.getElementById('filter-phase').value,
    status: document.getElementById('filter-status').value,
    search: document.getElementById('search-test').value,
    rendered: cards.length,
  });
  const flags = await api('GET', '/api/filter?' + params.toString());
  cards.forEach((card, i) => card.classList.toggle('hidden', !flags[i]));
}

async function copyQuery(index, kind) {
  const copy = await api('GET', '/api/test-cases/' + index + '/copy/' + kind);
  navigator.clipboard.writeText(copy.text).then(() => {
    alert(copy.message);
  }).catch((err) => {
    console.error('Failed to copy:', err);
    const textArea = document.createElement('textarea');
    textArea.value = copy.text;
    document.body.appendChild(textArea);
    textArea.select();
    document.execCommand('copy');
    document.body.removeChild(textArea);
    alert(copy.message);
  });
}

async function saveReportInfo(rerender) {
  await api('PUT', '/api/report', {
    reportingTool: document.getElementById('reporting-tool').value,
    validationDate: document.getElementById('validation-date').value,
    validator: document.getElementById('validator-name').value,
  });
  if (rerender) await renderTestCases();
}

async function saveReportDescription() {
  const result = await api('PUT', '/api/report/description', {
    description: document.getElementById('report-description').value,
  });
  alert(result.message);
}

function exportChecklist() {
  window.location.href = '/api/export/json';
}

async function exportToPDF() {
  const res = await fetch('/api/export/pdf');
  if (!res.ok) {
    alert(await res.text());
    return;
  }
  const blob = await res.blob();
  const disposition = res.headers.get('Content-Disposition') || '';
  const match = disposition.match(/filename="([^"]+)"/);
  const a = document.createElement('a');
  a.href = URL.createObjectURL(blob);
  a.download = match ? match[1] : 'Validation_Checklist.pdf';
  a.click();
  URL.revokeObjectURL(a.href);
  alert('PDF exported successfully!');
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_case::TestCaseInput;

    fn store_with_description(description: &str) -> ChecklistStore {
        let mut store = ChecklistStore::new(ReportingTool::PowerBi);
        store
            .add(TestCaseInput {
                id: "TC-1".into(),
                title: "Escaping".into(),
                phase: Phase::Technical,
                description: description.to_string(),
                source_query: String::new(),
                target_query: String::new(),
                expected_result: String::new(),
            })
            .unwrap();
        store
    }

    #[test]
    fn test_escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_script_in_description_renders_as_text() {
        let store = store_with_description("<script>alert(1)</script>");
        let html = render_cards(&store);
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_empty_store_renders_placeholder() {
        let store = ChecklistStore::new(ReportingTool::PowerBi);
        let html = render_cards(&store);
        assert!(html.contains(EMPTY_PLACEHOLDER));
        assert!(!html.contains("test-case-card"));
    }

    #[test]
    fn test_card_count_matches_store() {
        let mut store = ChecklistStore::seeded(ReportingTool::PowerBi);
        assert_eq!(render_cards(&store).matches("class=\"test-case-card ").count(), 10);

        store
            .remove(0, crate::application::use_cases::checklist_store::Confirmation::Confirmed)
            .unwrap();
        assert_eq!(render_cards(&store).matches("class=\"test-case-card ").count(), 9);
    }

    #[test]
    fn test_optional_sections_are_omitted() {
        let store = store_with_description("");
        let html = render_cards(&store);
        assert!(html.contains(NO_DESCRIPTION));
        assert!(!html.contains("query-box"));
        assert!(!html.contains("expected-result"));
        assert!(html.contains(NO_EVIDENCE));
    }

    #[test]
    fn test_tool_switch_changes_displayed_target_only() {
        let mut store = ChecklistStore::seeded(ReportingTool::PowerBi);
        let pbi = render_cards(&store);
        assert!(pbi.contains("One Lake Warehouse / Lakehouse"));
        assert!(pbi.contains("lakehouse.supplier_dim"));

        store.set_active_tool(ReportingTool::Oac);
        let oac = render_cards(&store);
        assert!(oac.contains("Target Query (Oracle ADW)"));
        assert!(oac.contains("dw_supplier_dim"));
        assert!(!oac.contains("lakehouse.supplier_dim"));
    }

    #[test]
    fn test_evidence_thumbnail_only_for_images_with_data() {
        let mut store = store_with_description("d");
        store
            .add_evidence(
                0,
                Evidence {
                    name: "shot.png".into(),
                    mime_type: "image/png".into(),
                    url: Some("data:image/png;base64,AAAA".into()),
                    file: None,
                },
            )
            .unwrap();
        store
            .add_evidence(
                0,
                Evidence {
                    name: "notes.pdf".into(),
                    mime_type: "application/pdf".into(),
                    url: None,
                    file: None,
                },
            )
            .unwrap();

        let html = render_cards(&store);
        assert_eq!(html.matches("<img ").count(), 1);
        assert!(html.contains(r#"src="data:image/png;base64,AAAA""#));
        assert!(html.contains("removeEvidence(0, 1)"));
    }

    #[test]
    fn test_status_buttons_mark_current() {
        let mut store = store_with_description("d");
        store.set_status(0, Status::Failed).unwrap();
        let html = render_cards(&store);
        assert!(html.contains(r#"class="status-btn failed active" data-status="failed""#));
        assert_eq!(html.matches(" active\"").count(), 1);
    }

    #[test]
    fn test_page_embeds_summary_and_escaped_header() {
        let mut store = ChecklistStore::seeded(ReportingTool::Oac);
        store.set_report_description("Q3 <draft>");
        let page = render_page(&store, "Top 10 Suppliers");
        assert!(page.contains(r#"<option value="oac" selected>"#));
        assert!(page.contains("Q3 &lt;draft&gt;"));
        assert!(page.contains(r#"id="total-tests">10<"#));
        assert!(page.contains("placeholder=\"TC-011\""));
    }

    #[test]
    fn test_card_sections_follow_header_in_order() {
        let mut store = ChecklistStore::new(ReportingTool::PowerBi);
        store
            .add(TestCaseInput {
                id: "TC-7".into(),
                title: "Totals".into(),
                phase: Phase::Accuracy,
                description: "Spend & count".into(),
                source_query: "SELECT 1".into(),
                target_query: "SELECT 2".into(),
                expected_result: "1 < 2".into(),
            })
            .unwrap();
        let html = render_cards(&store);

        let header = html.find("test-case-header").unwrap();
        let expected = html.find("<strong>Expected Result:</strong> 1 &lt; 2").unwrap();
        let actions = html.find("test-case-actions").unwrap();
        assert!(header < expected && expected < actions);
        assert!(html.contains("Spend &amp; count"));
        assert!(html.contains("handleEvidenceUpload(0, this)"));
        assert!(html.ends_with("</div>"));
    }

    #[test]
    fn test_upload_failures_are_reported_to_the_user() {
        let page = render_page(&ChecklistStore::new(ReportingTool::PowerBi), "Report");
        let upload = &page[page.find("function handleEvidenceUpload").unwrap()..];
        let upload = &upload[..upload.find("async function removeEvidence").unwrap()];
        assert!(upload.contains("try {"));
        assert!(upload.contains("catch (err)"));
        assert!(upload.contains("alert('Could not upload '"));
        assert!(upload.contains("reader.onerror"));
    }
}

//! HTML rendering for the admin panel.
//!
//! Pages are assembled with `format!`; every value that came from the
//! store or a form goes through `html_escape` first.

use crate::broadcast::BroadcastOutcome;
use crate::catalog::admin::{CategoryOverview, DashboardStats};
use crate::core::utils::{format_file_size, html_escape, truncate_chars};
use crate::storage::broadcasts::BroadcastRecord;
use crate::storage::categories::Category;
use crate::storage::files::FileListing;
use crate::storage::pending::PendingFile;
use crate::web::auth::Flash;
use crate::web::ConfigStatus;

const STYLE: &str = r#"
*{box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;margin:0;background:#f4f5f7;color:#1f2328}
nav{background:#1f2937;padding:12px 24px;display:flex;gap:18px;align-items:center}
nav a{color:#e5e7eb;text-decoration:none;font-weight:600}
nav a.active{color:#60a5fa}
nav .spacer{flex:1}
main{max-width:1100px;margin:24px auto;padding:0 24px}
.card{background:#fff;border-radius:10px;padding:20px;margin-bottom:20px;box-shadow:0 1px 3px rgba(0,0,0,.08)}
.flash{padding:10px 14px;border-radius:8px;margin-bottom:12px}
.flash.success{background:#dcfce7;color:#166534}
.flash.error{background:#fee2e2;color:#991b1b}
.flash.warning{background:#fef9c3;color:#854d0e}
.stats{display:grid;grid-template-columns:repeat(4,1fr);gap:16px}
.stat{background:#fff;border-radius:10px;padding:18px;text-align:center;box-shadow:0 1px 3px rgba(0,0,0,.08)}
.stat b{display:block;font-size:2rem}
table{width:100%;border-collapse:collapse}
th,td{text-align:left;padding:8px;border-bottom:1px solid #e5e7eb;vertical-align:top}
form.inline{display:inline}
input,select,textarea{padding:6px 8px;border:1px solid #d1d5db;border-radius:6px;font:inherit}
textarea{width:100%;min-height:120px}
button{padding:6px 12px;border:0;border-radius:6px;background:#2563eb;color:#fff;cursor:pointer}
button.danger{background:#dc2626}
.muted{color:#6b7280}
.sub{padding-left:24px}
"#;

fn render_flashes(flashes: &[Flash]) -> String {
    flashes
        .iter()
        .map(|f| {
            format!(
                r#"<div class="flash {}">{}</div>"#,
                f.level.css_class(),
                html_escape(&f.message)
            )
        })
        .collect()
}

fn nav(active: &str) -> String {
    let links = [
        ("/", "Dashboard"),
        ("/categories", "Categories"),
        ("/files", "Files"),
        ("/broadcast", "Broadcast"),
    ];
    let mut html = String::from("<nav>");
    for (href, label) in links {
        let class = if href == active { r#" class="active""# } else { "" };
        html.push_str(&format!(r#"<a href="{}"{}>{}</a>"#, href, class, label));
    }
    html.push_str(r#"<span class="spacer"></span><a href="/logout">Logout</a></nav>"#);
    html
}

fn layout(title: &str, active: Option<&str>, flashes: &[Flash], body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} · File Distribution Bot</title>
<style>{style}</style>
</head>
<body>
{nav}
<main>
{flashes}
{body}
</main>
</body>
</html>"#,
        title = html_escape(title),
        style = STYLE,
        nav = active.map(nav).unwrap_or_default(),
        flashes = render_flashes(flashes),
        body = body,
    )
}

fn category_options(categories: &[Category], selected: Option<&str>) -> String {
    categories
        .iter()
        .map(|c| {
            let sel = if Some(c.id.as_str()) == selected { " selected" } else { "" };
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                html_escape(&c.id),
                sel,
                html_escape(&c.name)
            )
        })
        .collect()
}

fn opt(value: Option<&str>) -> String {
    value.map(html_escape).unwrap_or_default()
}

pub fn login_page(flashes: &[Flash]) -> String {
    let body = r#"<div class="card" style="max-width:420px;margin:80px auto">
<h2>Admin Login</h2>
<form method="post" action="/login">
<p><label>Admin ID<br><input type="password" name="admin_id" required autofocus></label></p>
<button type="submit">Login</button>
</form>
</div>"#;
    layout("Login", None, flashes, body)
}

pub fn dashboard_page(flashes: &[Flash], stats: &DashboardStats, pending: &[PendingFile], config: &ConfigStatus) -> String {
    let status = |set: bool| if set { "✅ Set" } else { "❌ Not set" };

    let pending_rows: String = if pending.is_empty() {
        r#"<p class="muted">No pending uploads.</p>"#.to_string()
    } else {
        let rows: String = pending
            .iter()
            .map(|p| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                    html_escape(&p.name),
                    format_file_size(p.size),
                    html_escape(&p.uploaded_at)
                )
            })
            .collect();
        format!(
            r#"<table><tr><th>Name</th><th>Size</th><th>Uploaded</th></tr>{}</table>
<p><a href="/files">Assign pending files →</a></p>"#,
            rows
        )
    };

    let body = format!(
        r#"<h1>Dashboard</h1>
<div class="stats">
<div class="stat"><b>{}</b>Categories</div>
<div class="stat"><b>{}</b>Files</div>
<div class="stat"><b>{}</b>Active subscribers</div>
<div class="stat"><b>{}</b>Pending files</div>
</div>
<div class="card" style="margin-top:20px"><h2>Pending uploads</h2>{}</div>
<div class="card"><h2>Bot configuration</h2>
<table>
<tr><td>TELEGRAM_BOT_TOKEN</td><td>{}</td></tr>
<tr><td>ADMIN_ID</td><td>{}</td></tr>
<tr><td>STORAGE_CHANNEL_ID</td><td>{}</td></tr>
<tr><td>SESSION_SECRET</td><td>{}</td></tr>
</table></div>"#,
        stats.total_categories,
        stats.total_files,
        stats.total_subscribers,
        stats.pending_files,
        pending_rows,
        status(config.bot_token),
        status(config.admin_id),
        status(config.storage_channel_id),
        status(config.session_secret),
    );
    layout("Dashboard", Some("/"), flashes, &body)
}

fn category_row(category: &Category, class: &str) -> String {
    let id = html_escape(&category.id);
    format!(
        r#"<tr class="{class}"><td>{name}</td><td>{description}</td>
<td>
<form class="inline" method="post" action="/categories/{id}/edit">
<input name="name" value="{name}" required>
<input name="description" value="{description}" placeholder="Description">
<button type="submit">Save</button>
</form>
<form class="inline" method="post" action="/categories/{id}/delete" onsubmit="return confirm('Delete this category, its subcategories and all their files?')">
<button class="danger" type="submit">Delete</button>
</form>
</td></tr>"#,
        class = class,
        id = id,
        name = html_escape(&category.name),
        description = opt(category.description.as_deref()),
    )
}

pub fn categories_page(flashes: &[Flash], overview: &CategoryOverview) -> String {
    let mut rows = String::new();
    for node in &overview.roots {
        rows.push_str(&category_row(&node.category, "root"));
        for sub in &node.subcategories {
            rows.push_str(&category_row(sub, "sub"));
        }
    }
    if rows.is_empty() {
        rows = r#"<tr><td colspan="3" class="muted">No categories yet.</td></tr>"#.to_string();
    }

    let body = format!(
        r#"<h1>Categories</h1>
<div class="card"><h2>Add category</h2>
<form method="post" action="/categories/add">
<input name="name" placeholder="Name" required>
<input name="description" placeholder="Description">
<select name="parent_id"><option value="">(top level)</option>{options}</select>
<button type="submit">Add</button>
</form></div>
<div class="card"><h2>Category tree</h2>
<table><tr><th>Name</th><th>Description</th><th>Actions</th></tr>{rows}</table></div>"#,
        options = category_options(&overview.all, None),
        rows = rows,
    );
    layout("Categories", Some("/categories"), flashes, &body)
}

pub fn files_page(flashes: &[Flash], files: &[FileListing], categories: &[Category], pending: &[PendingFile]) -> String {
    let pending_html: String = if pending.is_empty() {
        r#"<p class="muted">No pending uploads. Send a document to the bot to add one.</p>"#.to_string()
    } else {
        pending
            .iter()
            .map(|p| {
                let id = html_escape(&p.id);
                format!(
                    r#"<tr><td>{name}<br><span class="muted">{size} · {mime}</span></td>
<td>
<form class="inline" method="post" action="/files/add_pending/{id}">
<input name="name" value="{name}" required>
<select name="category_id" required><option value="">Choose category</option>{options}</select>
<input name="description" placeholder="Description">
<button type="submit">Add to catalog</button>
</form>
<form class="inline" method="post" action="/files/pending/{id}/delete">
<button class="danger" type="submit">Discard</button>
</form>
</td></tr>"#,
                    id = id,
                    name = html_escape(&p.name),
                    size = format_file_size(p.size),
                    mime = opt(p.mime_type.as_deref()),
                    options = category_options(categories, None),
                )
            })
            .collect::<String>()
    };
    let pending_html = if pending.is_empty() {
        pending_html
    } else {
        format!("<table>{}</table>", pending_html)
    };

    let file_rows: String = files
        .iter()
        .map(|listing| {
            let f = &listing.file;
            let id = html_escape(&f.id);
            format!(
                r#"<tr><td>{name}<br><span class="muted">{description}</span></td><td>{category}</td><td>{size}</td>
<td>
<form class="inline" method="post" action="/files/{id}/edit">
<input name="name" value="{name}" required>
<select name="category_id" required>{options}</select>
<input name="description" value="{description}" placeholder="Description">
<input name="telegram_file_id" value="{handle}" placeholder="Telegram file id">
<button type="submit">Save</button>
</form>
<form class="inline" method="post" action="/files/{id}/delete" onsubmit="return confirm('Delete this file?')">
<button class="danger" type="submit">Delete</button>
</form>
</td></tr>"#,
                id = id,
                name = html_escape(&f.name),
                description = opt(f.description.as_deref()),
                category = html_escape(&listing.category_name),
                size = format_file_size(f.size),
                options = category_options(categories, Some(f.category_id.as_str())),
                handle = opt(f.telegram_file_id.as_deref()),
            )
        })
        .collect();
    let file_rows = if file_rows.is_empty() {
        r#"<tr><td colspan="4" class="muted">No files yet.</td></tr>"#.to_string()
    } else {
        file_rows
    };

    let body = format!(
        r#"<h1>Files</h1>
<div class="card"><h2>Pending uploads</h2>{pending}</div>
<div class="card"><h2>Add file</h2>
<form method="post" action="/files/add">
<input name="name" placeholder="Name" required>
<select name="category_id" required><option value="">Choose category</option>{options}</select>
<input name="description" placeholder="Description">
<input name="telegram_file_id" placeholder="Telegram file id">
<button type="submit">Add</button>
</form></div>
<div class="card"><h2>All files</h2>
<table><tr><th>Name</th><th>Category</th><th>Size</th><th>Actions</th></tr>{rows}</table></div>"#,
        pending = pending_html,
        options = category_options(categories, None),
        rows = file_rows,
    );
    layout("Files", Some("/files"), flashes, &body)
}

pub fn broadcast_page(
    flashes: &[Flash],
    subscriber_count: i64,
    recent: &[BroadcastRecord],
    bot_configured: bool,
) -> String {
    let warning = if bot_configured {
        String::new()
    } else {
        r#"<div class="flash warning">Bot token not configured: broadcasts cannot be sent.</div>"#.to_string()
    };

    let history: String = recent
        .iter()
        .map(|r| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                html_escape(&r.sent_at),
                html_escape(&truncate_chars(&r.message, 80)),
                r.sent_to_count,
                r.failed_count
            )
        })
        .collect();
    let history = if history.is_empty() {
        r#"<p class="muted">Nothing sent yet.</p>"#.to_string()
    } else {
        format!(
            "<table><tr><th>Sent</th><th>Message</th><th>Delivered</th><th>Failed</th></tr>{}</table>",
            history
        )
    };

    let body = format!(
        r#"<h1>Broadcast</h1>
{warning}
<div class="card">
<p>Active subscribers: <b>{count}</b></p>
<form method="post" action="/broadcast/send">
<textarea name="message" placeholder="Message (HTML allowed)" required></textarea>
<p><button type="submit">Send to all subscribers</button></p>
</form></div>
<div class="card"><h2>Recent broadcasts</h2>{history}</div>"#,
        warning = warning,
        count = subscriber_count,
        history = history,
    );
    layout("Broadcast", Some("/broadcast"), flashes, &body)
}

/// Flash for a finished broadcast run.
pub fn broadcast_flash(outcome: &BroadcastOutcome) -> Flash {
    match outcome {
        BroadcastOutcome::Sent { .. } => Flash::success(outcome.summary()),
        BroadcastOutcome::NoSubscribers => Flash::warning(outcome.summary()),
    }
}

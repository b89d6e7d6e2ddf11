use crate::models::{AppStatus, Habit, SyncConfig, TrackerView};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Circumference of the progress ring (r = 28).
const RING_LENGTH: f64 = 176.0;

/// Modal shown on top of the list.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    None,
    Settings,
    NewHabit,
    Edit(Habit),
}

pub struct IndexPage {
    pub today: String,
    pub view: TrackerView,
    pub config: SyncConfig,
    pub panel: Panel,
}

pub fn render_index(page: &IndexPage) -> String {
    let progress = &page.view.progress;
    let offset = RING_LENGTH * (1.0 - progress.percent / 100.0);

    INDEX_HTML
        .replace("{{TODAY}}", &escape_html(&page.today))
        .replace("{{DONE}}", &progress.completed.to_string())
        .replace("{{TOTAL}}", &progress.total.to_string())
        .replace("{{PERCENT}}", &progress.rounded_percent().to_string())
        .replace("{{RING_OFFSET}}", &format!("{offset:.2}"))
        .replace("{{BANNER}}", &render_banner(&page.view))
        .replace("{{HABITS}}", &render_habits(&page.view))
        .replace("{{PANEL}}", &render_panel(&page.panel, &page.config))
}

fn render_banner(view: &TrackerView) -> String {
    match view.status {
        AppStatus::Error => format!(
            r#"<div class="banner error">
        <span>Could not load habits: {}</span>
        <form method="post" action="/reload"><button class="btn-ghost" type="submit">Retry</button></form>
      </div>"#,
            escape_html(view.error.as_deref().unwrap_or("unknown error"))
        ),
        AppStatus::Loading | AppStatus::Ready => String::new(),
    }
}

fn render_habits(view: &TrackerView) -> String {
    if view.status == AppStatus::Loading && view.habits.is_empty() {
        return r#"<p class="empty">Loading...</p>"#.to_string();
    }
    if view.habits.is_empty() {
        return r#"<p class="empty">No habits yet. Add one with the + button.</p>"#.to_string();
    }

    view.habits.iter().map(render_habit).collect::<Vec<_>>().join("\n")
}

fn render_habit(habit: &Habit) -> String {
    let id = escape_html(&habit.id);
    let state = if habit.completed { "done" } else { "open" };
    let mark = if habit.completed { "&#10003;" } else { "" };
    let category = match habit.category.as_deref() {
        Some(category) => format!(r#"<span class="category">{}</span>"#, escape_html(category)),
        None => String::new(),
    };

    format!(
        r#"<div class="habit {state}" data-id="{id}">
        <form method="post" action="/habits/{path}/toggle" class="toggle">
          <button class="check" type="submit" aria-label="Toggle {name}">{mark}</button>
          <button class="label" type="submit">
            <span class="name">{name}</span>
            {category}
          </button>
        </form>
        <a class="edit" href="/?edit={query}" aria-label="Edit {name}">Edit</a>
      </div>"#,
        path = escape_html(&encode_query_value(&habit.id)),
        query = escape_html(&encode_query_value(&habit.id)),
        name = escape_html(&habit.name),
    )
}

fn render_panel(panel: &Panel, config: &SyncConfig) -> String {
    match panel {
        Panel::None => String::new(),
        Panel::Settings => format!(
            r#"<div class="modal">
      <a class="backdrop" href="/"></a>
      <form class="sheet" method="post" action="/settings">
        <h2>Settings</h2>
        <label for="endpoint_url">Apps Script Web App URL</label>
        <input id="endpoint_url" name="endpoint_url" type="text" value="{url}" placeholder="https://script.google.com/..." />
        <div class="row">
          <a class="btn-ghost" href="/">Cancel</a>
          <button class="btn-primary" type="submit">Save</button>
        </div>
      </form>
    </div>"#,
            url = escape_html(config.endpoint_url()),
        ),
        Panel::NewHabit => render_editor(None),
        Panel::Edit(habit) => render_editor(Some(habit)),
    }
}

fn render_editor(habit: Option<&Habit>) -> String {
    let (title, submit, id, name, category) = match habit {
        Some(habit) => (
            "Edit Habit",
            "Update",
            escape_html(&habit.id),
            escape_html(&habit.name),
            escape_html(habit.category_label()),
        ),
        None => ("New Habit", "Create", String::new(), String::new(), String::new()),
    };

    let delete = match habit {
        Some(habit) => format!(
            r#"<form method="post" action="/habits/{}/delete" onsubmit="return confirm('Are you sure you want to delete this habit?');">
          <button class="btn-danger" type="submit">Delete</button>
        </form>"#,
            escape_html(&encode_query_value(&habit.id))
        ),
        None => String::new(),
    };

    format!(
        r#"<div class="modal">
      <a class="backdrop" href="/"></a>
      <div class="sheet">
        <div class="row spread">
          <h2>{title}</h2>
          {delete}
        </div>
        <form method="post" action="/habits">
          <input type="hidden" name="id" value="{id}" />
          <label for="name">Habit Name</label>
          <input id="name" name="name" type="text" value="{name}" placeholder="e.g. Drink Water" required />
          <label for="category">Category (Optional)</label>
          <input id="category" name="category" type="text" value="{category}" placeholder="e.g. Health" />
          <div class="row">
            <a class="btn-ghost" href="/">Cancel</a>
            <button class="btn-primary" type="submit">{submit}</button>
          </div>
        </form>
      </div>
    </div>"#
    )
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '{' => escaped.push_str("&#123;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Everything outside the unreserved URL characters.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Today · Habits</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg: #f6f6fb;
      --ink: #1f2233;
      --muted: #8a8da3;
      --accent: #4f46e5;
      --accent-soft: #eef0ff;
      --danger: #d64545;
      --card: #ffffff;
      --shadow: 0 18px 40px rgba(79, 70, 229, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    .app {
      max-width: 460px;
      margin: 0 auto;
      padding: 28px 22px 96px;
      display: grid;
      gap: 22px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: flex-start;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-size: 2.2rem;
      margin: 0;
    }

    .subtitle {
      margin: 4px 0 0;
      color: var(--muted);
      font-weight: 500;
    }

    .icon-link {
      padding: 10px 12px;
      border-radius: 14px;
      background: var(--card);
      border: 1px solid #ececf4;
      color: var(--muted);
      text-decoration: none;
    }

    .progress {
      background: var(--accent);
      color: white;
      border-radius: 26px;
      padding: 22px 24px;
      box-shadow: var(--shadow);
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .progress .label {
      text-transform: uppercase;
      letter-spacing: 0.12em;
      font-size: 0.8rem;
      opacity: 0.8;
    }

    .progress .value {
      display: block;
      font-size: 1.5rem;
      font-weight: 600;
      margin-top: 4px;
    }

    .ring {
      position: relative;
      width: 64px;
      height: 64px;
      display: grid;
      place-items: center;
      font-size: 0.8rem;
      font-weight: 600;
    }

    .ring svg {
      position: absolute;
      inset: 0;
      transform: rotate(-90deg);
    }

    .ring .track {
      stroke: rgba(255, 255, 255, 0.25);
    }

    .ring .bar {
      stroke: white;
      transition: stroke-dashoffset 700ms ease-out;
    }

    .banner {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
      padding: 14px 16px;
      border-radius: 16px;
    }

    .banner.error {
      background: #fdecec;
      color: var(--danger);
    }

    .list {
      display: grid;
      gap: 12px;
    }

    .habit {
      display: flex;
      align-items: center;
      gap: 12px;
      padding: 14px;
      border-radius: 18px;
      background: var(--card);
      box-shadow: 0 2px 6px rgba(31, 34, 51, 0.05);
    }

    .habit.done {
      opacity: 0.6;
    }

    .habit .toggle {
      flex: 1;
      display: flex;
      align-items: center;
      gap: 14px;
      margin: 0;
    }

    button {
      appearance: none;
      border: none;
      background: none;
      font: inherit;
      cursor: pointer;
    }

    .check {
      width: 44px;
      height: 44px;
      border-radius: 12px;
      background: #f3f3f8;
      color: var(--accent);
      font-size: 1.3rem;
      font-weight: 700;
    }

    .habit.done .check {
      background: var(--accent-soft);
    }

    .label {
      flex: 1;
      text-align: left;
      padding: 0;
    }

    .name {
      display: block;
      font-weight: 600;
    }

    .habit.done .name {
      text-decoration: line-through;
      color: var(--muted);
    }

    .category {
      font-size: 0.65rem;
      font-weight: 700;
      letter-spacing: 0.14em;
      text-transform: uppercase;
      color: #8b85f0;
    }

    .edit {
      color: var(--muted);
      text-decoration: none;
      font-size: 0.85rem;
    }

    .empty {
      text-align: center;
      color: var(--muted);
      padding: 60px 0;
    }

    .fab {
      position: fixed;
      right: 28px;
      bottom: 28px;
      width: 56px;
      height: 56px;
      border-radius: 18px;
      background: var(--accent);
      color: white;
      font-size: 2rem;
      display: grid;
      place-items: center;
      text-decoration: none;
      box-shadow: var(--shadow);
    }

    .modal {
      position: fixed;
      inset: 0;
      display: grid;
      place-items: center;
      padding: 16px;
      z-index: 50;
    }

    .backdrop {
      position: absolute;
      inset: 0;
      background: rgba(0, 0, 0, 0.4);
      backdrop-filter: blur(4px);
    }

    .sheet {
      position: relative;
      width: min(420px, 100%);
      background: var(--card);
      border-radius: 26px;
      padding: 28px;
      display: grid;
      gap: 10px;
    }

    .sheet h2 {
      margin: 0;
    }

    .sheet form {
      display: grid;
      gap: 10px;
      margin: 0;
    }

    .sheet label {
      font-size: 0.75rem;
      font-weight: 700;
      text-transform: uppercase;
      color: var(--muted);
    }

    .sheet input[type="text"] {
      width: 100%;
      padding: 14px;
      border-radius: 12px;
      border: none;
      background: #f3f3f8;
      font: inherit;
    }

    .row {
      display: flex;
      gap: 8px;
      margin-top: 10px;
    }

    .row.spread {
      justify-content: space-between;
      align-items: center;
      margin-top: 0;
    }

    .btn-primary,
    .btn-ghost {
      flex: 1;
      padding: 14px;
      border-radius: 12px;
      font-weight: 700;
      text-align: center;
      text-decoration: none;
    }

    .btn-primary {
      background: var(--accent);
      color: white;
    }

    .btn-ghost {
      color: var(--muted);
    }

    .btn-danger {
      color: var(--danger);
      font-weight: 600;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>Today</h1>
        <p class="subtitle">{{TODAY}}</p>
      </div>
      <a class="icon-link" href="/?panel=settings" aria-label="Settings">Settings</a>
    </header>

    <section class="progress">
      <div>
        <span class="label">Progress</span>
        <span class="value" id="progress">{{DONE}} of {{TOTAL}} Done</span>
      </div>
      <div class="ring">
        <svg viewBox="0 0 64 64" width="64" height="64">
          <circle class="track" cx="32" cy="32" r="28" stroke-width="6" fill="transparent" />
          <circle class="bar" cx="32" cy="32" r="28" stroke-width="6" fill="transparent" stroke-dasharray="176" stroke-dashoffset="{{RING_OFFSET}}" />
        </svg>
        <span id="percent">{{PERCENT}}%</span>
      </div>
    </section>

    {{BANNER}}

    <section class="list">
      {{HABITS}}
    </section>
  </main>

  <a class="fab" href="/?panel=new" aria-label="New habit">+</a>

  {{PANEL}}
</body>
</html>
"#;

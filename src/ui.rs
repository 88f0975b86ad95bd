use crate::achievements::AchievementBoard;
use crate::calendar::{CalendarMode, CalendarView, DayCell};
use crate::models::HeroBadge;

pub fn render_index(
    date: &str,
    badge: &HeroBadge,
    calendar: &CalendarView,
    achievements: &AchievementBoard,
) -> String {
    let badge_class = if badge.hot { "badge hot" } else { "badge" };
    let toggle_label = match calendar.mode {
        CalendarMode::Week => "Show month",
        CalendarMode::Month => "Show week",
    };

    INDEX_HTML
        .replace("{{DATE}}", date)
        .replace("{{BADGE_CLASS}}", badge_class)
        .replace("{{BADGE}}", &escape(&badge.text))
        .replace("{{CALENDAR_TITLE}}", &escape(&calendar.title))
        .replace("{{CALENDAR_MODE}}", mode_class(calendar))
        .replace("{{TOGGLE_LABEL}}", toggle_label)
        .replace("{{PREV_DISABLED}}", disabled(calendar.can_go_prev))
        .replace("{{NEXT_DISABLED}}", disabled(calendar.can_go_next))
        .replace("{{CALENDAR_CELLS}}", &render_cells(&calendar.cells))
        .replace(
            "{{ACHIEVEMENT_COUNT}}",
            &format!("{}/{}", achievements.unlocked_count, achievements.total),
        )
        .replace("{{ACHIEVEMENTS}}", &render_achievements(achievements))
}

fn mode_class(calendar: &CalendarView) -> &'static str {
    match calendar.mode {
        CalendarMode::Week => "mood-calendar mood-calendar--compact",
        CalendarMode::Month => "mood-calendar",
    }
}

fn disabled(enabled: bool) -> &'static str {
    if enabled { "" } else { "disabled" }
}

fn render_cells(cells: &[DayCell]) -> String {
    let mut html = String::new();
    for cell in cells {
        let Some(day) = cell.day() else {
            html.push_str(r#"<div class="day day--empty"></div>"#);
            continue;
        };

        let mut classes = String::from("day");
        if day.is_today {
            classes.push_str(" day--today");
        }
        if day.is_future {
            classes.push_str(" day--future");
        }

        match &day.entry {
            Some(entry) => {
                classes.push_str(" day--has-mood");
                let mut title = match entry.notes.as_deref().filter(|n| !n.is_empty()) {
                    Some(notes) => format!("{}: {}", entry.label, notes),
                    None => entry.label.clone(),
                };
                let tags = entry.tag_list();
                if !tags.is_empty() {
                    title.push_str(&format!(" [{}]", tags.join(", ")));
                }
                html.push_str(&format!(
                    r#"<div class="{classes}" data-date="{}" data-score="{}" title="{}"><span class="day-number">{}</span><span class="day-emoji">{}</span></div>"#,
                    day.date_key,
                    entry.score,
                    escape(&title),
                    escape(&day.label),
                    escape(&entry.emoji),
                ));
            }
            None => html.push_str(&format!(
                r#"<div class="{classes}" data-date="{}"><span class="day-number">{}</span></div>"#,
                day.date_key,
                escape(&day.label),
            )),
        }
    }
    html
}

fn render_achievements(board: &AchievementBoard) -> String {
    board
        .achievements
        .iter()
        .map(|a| {
            let state = if a.unlocked { "unlocked" } else { "locked" };
            let new = if a.is_new { " achievement--new" } else { "" };
            format!(
                r#"<div class="achievement achievement--{state}{new}" title="{}"><span class="achievement-icon">{}</span><span class="achievement-name">{}</span></div>"#,
                escape(a.description.as_deref().unwrap_or("???")),
                a.icon,
                escape(&a.name),
            )
        })
        .collect()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mood Ledger</title>
  <style>
    :root {
      --bg-1: #eef4f1;
      --ink: #24302c;
      --accent: #ff6b4a;
      --accent-2: #2f5848;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 88, 72, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #f9f6ee 70%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1, h2 {
      margin: 0;
    }

    .subtitle {
      margin: 4px 0 0;
      color: #5f6a65;
    }

    .badge {
      display: inline-block;
      padding: 8px 16px;
      border-radius: 999px;
      background: rgba(47, 88, 72, 0.1);
      font-weight: 600;
    }

    .badge.hot {
      background: var(--accent);
      color: white;
    }

    .actions {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent-2);
      color: white;
    }

    button[disabled] {
      opacity: 0.35;
      cursor: default;
    }

    .calendar-header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    .calendar-header form {
      display: inline;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 6px;
      margin-top: 12px;
    }

    .day {
      min-height: 52px;
      border-radius: 12px;
      background: white;
      border: 1px solid rgba(47, 88, 72, 0.08);
      padding: 6px;
      display: grid;
      place-items: center;
    }

    .day--empty {
      background: transparent;
      border: none;
    }

    .day--today {
      border: 2px solid var(--accent);
    }

    .day--future {
      opacity: 0.4;
    }

    .day--has-mood {
      background: #e5f3ec;
    }

    .day-emoji {
      font-size: 1.3rem;
    }

    .achievements {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(120px, 1fr));
      gap: 10px;
    }

    .achievement {
      display: grid;
      place-items: center;
      padding: 10px;
      border-radius: 14px;
      background: white;
      text-align: center;
    }

    .achievement--locked {
      filter: grayscale(1);
      opacity: 0.45;
    }

    .achievement--new {
      border: 2px solid var(--accent);
    }

    .status {
      min-height: 1.2em;
      color: #6b645d;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Mood Ledger</h1>
      <p class="subtitle">{{DATE}}</p>
    </header>

    <section>
      <span id="badge" class="{{BADGE_CLASS}}">{{BADGE}}</span>
    </section>

    <section class="actions">
      <form class="checkin-form" method="post" action="/checkin">
        <input type="hidden" name="kind" value="mood" />
        <button type="submit">Log mood check-in</button>
      </form>
      <form class="checkin-form" method="post" action="/checkin">
        <input type="hidden" name="kind" value="gad7" />
        <button type="submit">Completed GAD-7</button>
      </form>
      <form class="checkin-form" method="post" action="/checkin">
        <input type="hidden" name="kind" value="phq9" />
        <button type="submit">Completed PHQ-9</button>
      </form>
    </section>

    <section class="{{CALENDAR_MODE}}">
      <div class="calendar-header">
        <form method="post" action="/calendar/prev"><button type="submit" {{PREV_DISABLED}}>&larr;</button></form>
        <h2>{{CALENDAR_TITLE}}</h2>
        <form method="post" action="/calendar/next"><button type="submit" {{NEXT_DISABLED}}>&rarr;</button></form>
        <form method="post" action="/calendar/toggle"><button type="submit">{{TOGGLE_LABEL}}</button></form>
      </div>
      <div class="grid">{{CALENDAR_CELLS}}</div>
    </section>

    <section>
      <h2>Achievements <small>{{ACHIEVEMENT_COUNT}}</small></h2>
      <div class="achievements">{{ACHIEVEMENTS}}</div>
    </section>

    <div class="status" id="status"></div>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const badgeEl = document.getElementById('badge');

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    document.querySelectorAll('.checkin-form').forEach((form) => {
      form.addEventListener('submit', async (event) => {
        event.preventDefault();
        setStatus('Saving...', 'info');
        try {
          const res = await fetch('/api/checkin', {
            method: 'POST',
            headers: { 'content-type': 'application/json' },
            body: JSON.stringify({ kind: form.elements.kind.value })
          });
          if (!res.ok) {
            throw new Error((await res.text()) || 'Request failed');
          }
          const data = await res.json();
          badgeEl.textContent = data.badge.text;
          badgeEl.classList.toggle('hot', data.badge.hot);
          window.location.reload();
        } catch (err) {
          setStatus(err.message, 'error');
        }
      });
    });
  </script>
</body>
</html>
"#;

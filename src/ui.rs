use crate::config::UiConfig;

pub fn render_index(ui: &UiConfig) -> String {
    // Keep `</script>` out of the embedded JSON.
    let config = serde_json::to_string(ui)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");
    INDEX_HTML
        .replace("{{THEME_CLASS}}", if ui.dark_mode { "dark" } else { "" })
        .replace("{{CONFIG}}", &config)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en" class="{{THEME_CLASS}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>FocusLab</title>
  <style>
    :root {
      --bg: #fafafa;
      --card: #ffffff;
      --ink: #18181b;
      --muted: #71717a;
      --line: #e4e4e7;
      --soft: #f4f4f5;
      --build: #10b981;
      --break: #f43f5e;
      --shadow: 0 1px 2px rgba(0, 0, 0, 0.05);
    }

    .dark {
      --bg: #09090b;
      --card: #18181b;
      --ink: #f4f4f5;
      --muted: #a1a1aa;
      --line: #27272a;
      --soft: #27272a;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", system-ui, sans-serif;
      font-size: 14px;
    }

    button {
      font: inherit;
      cursor: pointer;
      border: 1px solid var(--line);
      background: var(--card);
      color: var(--ink);
      border-radius: 6px;
      padding: 6px 10px;
    }

    button.primary {
      background: var(--ink);
      color: var(--bg);
      border-color: var(--ink);
    }

    button:disabled {
      opacity: 0.5;
      cursor: default;
    }

    input {
      font: inherit;
      width: 100%;
      padding: 8px 10px;
      border-radius: 6px;
      border: 1px solid var(--line);
      background: var(--bg);
      color: var(--ink);
    }

    .hidden {
      display: none !important;
    }

    .card {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 12px;
      box-shadow: var(--shadow);
    }

    .login {
      min-height: 100vh;
      display: grid;
      place-items: center;
      padding: 16px;
    }

    .login .card {
      width: min(420px, 100%);
      padding: 32px;
      text-align: center;
      display: grid;
      gap: 12px;
    }

    .login h1 {
      margin: 0;
      font-size: 1.6rem;
    }

    .muted {
      color: var(--muted);
    }

    header.top {
      display: flex;
      align-items: center;
      justify-content: space-between;
      padding: 16px 24px;
      border-bottom: 1px solid var(--line);
      gap: 12px;
    }

    .month {
      display: flex;
      align-items: center;
      gap: 12px;
    }

    .month h2 {
      margin: 0;
      font-size: 1.4rem;
    }

    .month small {
      display: block;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      font-size: 10px;
      color: var(--muted);
    }

    .toolbar {
      display: flex;
      align-items: center;
      gap: 8px;
    }

    .layout {
      display: grid;
      grid-template-columns: 260px 1fr;
      gap: 24px;
      padding: 24px;
    }

    @media (max-width: 900px) {
      .layout {
        grid-template-columns: 1fr;
      }
    }

    aside {
      display: grid;
      gap: 16px;
      align-content: start;
    }

    aside .card {
      padding: 16px;
      display: grid;
      gap: 10px;
    }

    aside h3 {
      margin: 0;
      font-size: 11px;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .segmented {
      display: flex;
      gap: 4px;
      background: var(--soft);
      padding: 3px;
      border-radius: 8px;
    }

    .segmented button {
      flex: 1;
      border: none;
      background: transparent;
      font-size: 11px;
      font-weight: 700;
      text-transform: uppercase;
      color: var(--muted);
    }

    .segmented button.active {
      background: var(--card);
      color: var(--ink);
    }

    .segmented button.active[data-value="build"] {
      color: var(--build);
    }

    .segmented button.active[data-value="break"] {
      color: var(--break);
    }

    main {
      display: grid;
      gap: 24px;
      min-width: 0;
    }

    .section-head {
      display: flex;
      justify-content: space-between;
      align-items: center;
      padding: 12px 16px;
      border-bottom: 1px solid var(--line);
    }

    .section-head h3 {
      margin: 0;
      font-size: 14px;
    }

    .scroller {
      overflow-x: auto;
    }

    table.grid {
      border-collapse: collapse;
      min-width: 800px;
      width: 100%;
    }

    table.grid th,
    table.grid td {
      border-right: 1px dashed var(--line);
      text-align: center;
      padding: 4px;
    }

    table.grid th.name,
    table.grid td.name {
      position: sticky;
      left: 0;
      background: var(--card);
      text-align: left;
      min-width: 220px;
      padding: 10px 12px;
      z-index: 1;
      border-right: 1px solid var(--line);
    }

    table.grid th.today {
      background: var(--soft);
    }

    table.grid .weekend {
      background: color-mix(in srgb, var(--soft) 40%, transparent);
    }

    .weekday {
      font-size: 10px;
      color: var(--muted);
    }

    .cell {
      width: 30px;
      height: 30px;
      margin: 0 auto;
      border-radius: 6px;
      border: 1px solid var(--line);
      display: grid;
      place-items: center;
      font-weight: 700;
      color: transparent;
      cursor: pointer;
    }

    .cell.build.marked {
      background: var(--build);
      border-color: var(--build);
      color: #fff;
    }

    .cell.break.marked {
      background: var(--break);
      border-color: var(--break);
      color: #fff;
    }

    .cell.locked {
      opacity: 0.3;
      cursor: default;
    }

    .row-title {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 6px;
    }

    .row-title .actions button {
      border: none;
      padding: 2px 6px;
      color: var(--muted);
      background: transparent;
    }

    .badge {
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 50%;
      margin-right: 6px;
    }

    .progress {
      margin-top: 6px;
      font-size: 10px;
      color: var(--muted);
    }

    .bar {
      height: 6px;
      border-radius: 999px;
      background: var(--soft);
      overflow: hidden;
      margin-top: 4px;
    }

    .bar span {
      display: block;
      height: 100%;
      border-radius: 999px;
    }

    .empty {
      padding: 48px;
      text-align: center;
    }

    .analytics {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 16px;
    }

    .panel {
      padding: 16px;
      display: grid;
      gap: 12px;
    }

    .panel h3 {
      margin: 0;
      font-size: 14px;
    }

    .panel svg {
      width: 100%;
      height: auto;
    }

    .panel svg text {
      fill: var(--muted);
      font-size: 10px;
    }

    .legend {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      font-size: 11px;
      color: var(--muted);
    }

    table.goals {
      width: 100%;
      border-collapse: collapse;
    }

    table.goals th {
      text-align: left;
      font-size: 10px;
      text-transform: uppercase;
      color: var(--muted);
      padding-bottom: 8px;
    }

    table.goals td {
      padding: 8px 4px;
      border-top: 1px solid var(--line);
    }

    .status {
      position: fixed;
      bottom: 16px;
      right: 16px;
      padding: 8px 12px;
      border-radius: 8px;
      background: var(--ink);
      color: var(--bg);
      font-size: 12px;
    }

    .status:empty {
      display: none;
    }
  </style>
</head>
<body>
  <section id="login" class="login hidden">
    <div class="card">
      <h1>FocusLab</h1>
      <p class="muted">Master your routine, one day at a time.</p>
      <form id="login-form">
        <input id="login-name" type="text" placeholder="Your name" autocomplete="username" />
        <button class="primary" type="submit" style="width:100%;margin-top:8px">Sign in</button>
      </form>
      <button id="guest-btn" type="button">Continue as Guest</button>
    </div>
  </section>

  <section id="app" class="hidden">
    <header class="top">
      <div class="month">
        <div>
          <h2 id="month-name"></h2>
          <small id="month-year"></small>
        </div>
        <button id="prev-month" type="button" aria-label="Previous month">&lsaquo;</button>
        <button id="next-month" type="button" aria-label="Next month">&rsaquo;</button>
      </div>
      <div class="toolbar">
        <button id="theme-btn" type="button">Theme</button>
        <span id="user-name" class="muted"></span>
        <button id="sign-out" type="button">Sign out</button>
      </div>
    </header>

    <div class="layout">
      <aside>
        <div class="card">
          <h3>Create Habit</h3>
          <form id="habit-form">
            <label class="muted" for="habit-title">Name</label>
            <input id="habit-title" type="text" placeholder="e.g. Read 30 mins" />
            <div id="goal-field">
              <label class="muted" for="habit-goal">Goal (Days/Mo)</label>
              <input id="habit-goal" type="number" min="1" max="31" value="31" />
            </div>
            <div class="segmented" id="type-picker" style="margin-top:8px">
              <button type="button" data-value="build" class="active">Build</button>
              <button type="button" data-value="break">Break</button>
            </div>
            <button id="create-btn" class="primary" type="submit" style="width:100%;margin-top:8px" disabled>Create Habit</button>
          </form>
        </div>
        <div class="card" id="filter-card">
          <h3>Analytics View</h3>
          <div class="segmented" id="filter-picker">
            <button type="button" data-value="build">Build</button>
            <button type="button" data-value="break">Break</button>
            <button type="button" data-value="all">All</button>
          </div>
        </div>
      </aside>

      <main>
        <div id="sections"></div>
        <div id="empty" class="card empty hidden">
          <h3>No habits yet</h3>
          <p class="muted">Create your first habit using the form on the left to start tracking your progress.</p>
        </div>

        <div class="analytics" id="analytics">
          <div class="card panel">
            <h3>Consistency trend</h3>
            <svg id="trend-chart" viewBox="0 0 600 240" role="img" aria-label="Cumulative consistency"></svg>
            <div class="legend" id="trend-legend"></div>
          </div>
          <div class="card panel" id="goals-panel">
            <h3>Goals</h3>
            <table class="goals">
              <thead>
                <tr><th>Habit</th><th>Goal</th><th>Actual</th><th>Progress</th></tr>
              </thead>
              <tbody id="goal-rows"></tbody>
            </table>
          </div>
          <div class="card panel">
            <h3>Weekday consistency</h3>
            <svg id="radar-chart" viewBox="0 0 300 260" role="img" aria-label="Weekday consistency"></svg>
          </div>
          <div class="card panel">
            <h3>Daily focus</h3>
            <svg id="pie-chart" viewBox="0 0 240 200" role="img" aria-label="Today"></svg>
            <p id="pie-caption" class="muted" style="margin:0;text-align:center"></p>
          </div>
        </div>
      </main>
    </div>
  </section>

  <div class="status" id="status"></div>

  <script>
    const CONFIG = {{CONFIG}};
    const TOKEN_KEY = 'habit-session';
    const THEME_KEY = 'habit-theme';

    const $ = (id) => document.getElementById(id);
    const state = {
      token: localStorage.getItem(TOKEN_KEY),
      user: null,
      month: null,
      filter: CONFIG.default_filter || 'build',
      newType: 'build',
      editingId: null,
      stream: null,
      grid: null
    };

    const setStatus = (message) => {
      $('status').textContent = message || '';
      if (message) {
        setTimeout(() => { if ($('status').textContent === message) $('status').textContent = ''; }, 2000);
      }
    };

    const escapeHtml = (value) => String(value)
      .replace(/&/g, '&amp;')
      .replace(/</g, '&lt;')
      .replace(/>/g, '&gt;')
      .replace(/"/g, '&quot;');

    // The server may run in another zone, so every date-sensitive call
    // carries the browser's own calendar date.
    const localToday = () => {
      const now = new Date();
      const pad = (n) => String(n).padStart(2, '0');
      return `${now.getFullYear()}-${pad(now.getMonth() + 1)}-${pad(now.getDate())}`;
    };

    const api = async (method, path, body) => {
      const headers = {};
      if (state.token) headers['authorization'] = `Bearer ${state.token}`;
      if (body !== undefined) headers['content-type'] = 'application/json';
      const res = await fetch(path, {
        method,
        headers,
        body: body === undefined ? undefined : JSON.stringify(body)
      });
      if (res.status === 401 && path !== '/api/auth/sign-in' && path !== '/api/auth/guest') {
        signedOut();
        throw new Error('Session expired');
      }
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.status === 204 ? null : res.json();
    };

    // --- theme ---
    const applyTheme = (dark) => {
      document.documentElement.classList.toggle('dark', dark);
      localStorage.setItem(THEME_KEY, dark ? 'dark' : 'light');
    };
    const storedTheme = localStorage.getItem(THEME_KEY);
    if (storedTheme) applyTheme(storedTheme === 'dark');
    $('theme-btn').addEventListener('click', () => {
      applyTheme(!document.documentElement.classList.contains('dark'));
    });

    // --- session ---
    const signedIn = (session) => {
      state.token = session.token;
      localStorage.setItem(TOKEN_KEY, session.token);
      enterApp(session.user);
    };

    const signedOut = () => {
      state.token = null;
      state.user = null;
      localStorage.removeItem(TOKEN_KEY);
      if (state.stream) {
        state.stream.close();
        state.stream = null;
      }
      $('app').classList.add('hidden');
      $('login').classList.remove('hidden');
      $('guest-btn').classList.toggle('hidden', !CONFIG.allow_guest);
    };

    const enterApp = (user) => {
      state.user = user;
      $('login').classList.add('hidden');
      $('app').classList.remove('hidden');
      $('user-name').textContent = user.anonymous ? 'Guest' : (user.display_name || '');
      $('goal-field').classList.toggle('hidden', !CONFIG.goal_tracking);
      $('goals-panel').classList.toggle('hidden', !CONFIG.goal_tracking);
      $('filter-card').classList.toggle('hidden', !CONFIG.analytics_filter);
      markSegment('filter-picker', state.filter);
      openStream();
    };

    $('login-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      try {
        signedIn(await api('POST', '/api/auth/sign-in', { name: $('login-name').value }));
      } catch (err) {
        alert(err.message || 'Login failed.');
      }
    });

    $('guest-btn').addEventListener('click', async () => {
      try {
        signedIn(await api('POST', '/api/auth/guest'));
      } catch (err) {
        alert(err.message || 'Guest login failed.');
      }
    });

    $('sign-out').addEventListener('click', async () => {
      try {
        await api('POST', '/api/auth/sign-out');
      } catch (err) {
        console.error(err);
      }
      signedOut();
    });

    // --- live updates ---
    const openStream = () => {
      if (state.stream) state.stream.close();
      const stream = new EventSource(`/api/habits/stream?token=${encodeURIComponent(state.token)}`);
      stream.addEventListener('habits', () => {
        refresh().catch((err) => setStatus(err.message));
      });
      stream.onerror = (err) => console.error('habit stream error', err);
      state.stream = stream;
    };

    const refresh = async () => {
      const today = localToday();
      const query = state.month ? `&month=${state.month}` : '';
      const grid = await api('GET', `/api/calendar?today=${today}${query}`);
      state.month = grid.month.key;
      state.grid = grid;
      renderGrid(grid);
      const stats = await api(
        'GET',
        `/api/stats?month=${state.month}&filter=${state.filter}&today=${today}`
      );
      renderStats(stats);
    };

    $('prev-month').addEventListener('click', () => {
      if (!state.grid) return;
      state.month = state.grid.month.prev;
      refresh().catch((err) => setStatus(err.message));
    });

    $('next-month').addEventListener('click', () => {
      if (!state.grid) return;
      state.month = state.grid.month.next;
      refresh().catch((err) => setStatus(err.message));
    });

    // --- sidebar ---
    const markSegment = (id, value) => {
      document.querySelectorAll(`#${id} button`).forEach((button) => {
        button.classList.toggle('active', button.dataset.value === value);
      });
    };

    document.querySelectorAll('#type-picker button').forEach((button) => {
      button.addEventListener('click', () => {
        state.newType = button.dataset.value;
        markSegment('type-picker', state.newType);
        $('habit-goal').value = state.newType === 'build' ? 31 : 4;
      });
    });

    document.querySelectorAll('#filter-picker button').forEach((button) => {
      button.addEventListener('click', () => {
        state.filter = button.dataset.value;
        markSegment('filter-picker', state.filter);
        refresh().catch((err) => setStatus(err.message));
      });
    });

    $('habit-title').addEventListener('input', () => {
      $('create-btn').disabled = !$('habit-title').value.trim();
    });

    $('habit-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const title = $('habit-title').value.trim();
      if (!title) return;
      const body = { title, type: state.newType };
      if (CONFIG.goal_tracking) body.goal = parseInt($('habit-goal').value, 10);
      try {
        await api('POST', '/api/habits', body);
        $('habit-title').value = '';
        $('create-btn').disabled = true;
        $('habit-goal').value = state.newType === 'build' ? 31 : 4;
      } catch (err) {
        console.error(err);
        setStatus(err.message);
      }
    });

    // --- grid ---
    const badge = (row) => CONFIG.badge_style === 'icon' && row.icon
      ? `<span style="margin-right:6px">${escapeHtml(row.icon)}</span>`
      : `<span class="badge" style="background:${row.color}"></span>`;

    const renderRow = (section, row, days) => {
      const title = state.editingId === row.habit_id
        ? `<div class="row-title">
             <input data-edit="${row.habit_id}" value="${escapeHtml(row.title)}" />
             <span class="actions">
               <button type="button" data-save="${row.habit_id}">Save</button>
               <button type="button" data-cancel="${row.habit_id}">Cancel</button>
             </span>
           </div>`
        : `<div class="row-title">
             <span>${badge(row)}${escapeHtml(row.title)}</span>
             <span class="actions">
               <button type="button" data-rename="${row.habit_id}">Edit</button>
               <button type="button" data-delete="${row.habit_id}">Delete</button>
             </span>
           </div>`;
      const progress = CONFIG.goal_tracking
        ? `<div class="progress"><span>${row.score} / ${row.goal}</span> <span style="float:right">${row.progress_percent}%</span>
             <div class="bar"><span style="width:${row.progress_percent}%;background:${section.habit_type === 'build' ? 'var(--build)' : 'var(--break)'}"></span></div>
           </div>`
        : '';
      const mark = section.habit_type === 'build' ? '&#10003;' : '&#10005;';
      const cells = row.cells.map((cell, index) => `
        <td class="${days[index].is_weekend ? 'weekend' : ''}">
          <div class="cell ${section.habit_type} ${cell.marked ? 'marked' : ''} ${cell.locked ? 'locked' : ''}"
               data-habit="${row.habit_id}" data-date="${cell.date_key}" data-locked="${cell.locked}">${mark}</div>
        </td>`).join('');
      return `<tr><td class="name">${title}${progress}</td>${cells}</tr>`;
    };

    const renderGrid = (grid) => {
      $('month-name').textContent = grid.month.name;
      $('month-year').textContent = grid.month.year;
      $('empty').classList.toggle('hidden', grid.habit_count > 0);
      $('analytics').classList.toggle('hidden', grid.habit_count === 0);

      const head = grid.days.map((d) => `
        <th class="${d.is_weekend ? 'weekend' : ''} ${d.is_today ? 'today' : ''}" data-is-today="${d.is_today}">
          <div class="weekday">${d.weekday_label}</div>
          <div>${d.day}</div>
        </th>`).join('');

      $('sections').innerHTML = grid.sections.map((section) => `
        <div class="card" style="margin-bottom:24px;overflow:hidden">
          <div class="section-head">
            <h3>${section.title}</h3>
            <span class="muted">${section.rows.length} habits</span>
          </div>
          <div class="scroller">
            <table class="grid">
              <thead><tr><th class="name">Habit Name</th>${head}</tr></thead>
              <tbody>${section.rows.map((row) => renderRow(section, row, grid.days)).join('')}</tbody>
            </table>
          </div>
        </div>`).join('');

      if (grid.scroll_anchor !== null) {
        const centre = () => document.querySelectorAll('.scroller').forEach((scroller) => {
          const column = scroller.querySelector('[data-is-today="true"]');
          if (!column) return;
          scroller.scrollLeft = column.offsetLeft - scroller.clientWidth / 2 + column.clientWidth / 2;
        });
        centre();
        setTimeout(centre, 100);
      }
    };

    $('sections').addEventListener('click', async (event) => {
      const target = event.target.closest('[data-date], [data-rename], [data-save], [data-cancel], [data-delete]');
      if (!target) return;
      try {
        if (target.dataset.date) {
          if (target.dataset.locked === 'true') return;
          await api('POST', `/api/habits/${target.dataset.habit}/toggle`, { date: target.dataset.date, today: localToday() });
        } else if (target.dataset.rename) {
          state.editingId = target.dataset.rename;
          renderGrid(state.grid);
        } else if (target.dataset.cancel) {
          state.editingId = null;
          renderGrid(state.grid);
        } else if (target.dataset.save) {
          const id = target.dataset.save;
          const title = document.querySelector(`[data-edit="${id}"]`).value;
          state.editingId = null;
          if (title.trim()) {
            await api('PATCH', `/api/habits/${id}`, { title });
          } else {
            renderGrid(state.grid);
          }
        } else if (target.dataset.delete) {
          if (!confirm('Are you sure?')) return;
          await api('DELETE', `/api/habits/${target.dataset.delete}`);
        }
      } catch (err) {
        console.error(err);
        setStatus(err.message);
      }
    });

    // --- charts ---
    const renderTrend = (stats) => {
      const svg = $('trend-chart');
      const width = 600, height = 240, left = 36, right = 12, top = 12, bottom = 28;
      const days = stats.days_in_month;
      const x = (day) => left + (days > 1 ? (day - 1) * (width - left - right) / (days - 1) : 0);
      const y = (pct) => height - bottom - pct * (height - top - bottom) / 100;

      let grid = '';
      [0, 25, 50, 75, 100].forEach((pct) => {
        grid += `<line x1="${left}" x2="${width - right}" y1="${y(pct)}" y2="${y(pct)}" stroke="var(--line)" stroke-dasharray="3 3" />`;
        grid += `<text x="${left - 6}" y="${y(pct) + 3}" text-anchor="end">${pct}%</text>`;
      });

      const labels = (stats.trend[0] ? stats.trend[0].points : [])
        .filter((p, i) => i % 5 === 0)
        .map((p) => `<text x="${x(p.day)}" y="${height - 8}" text-anchor="middle">${escapeHtml(p.label)}</text>`)
        .join('');

      const series = stats.trend.map((s) => {
        if (!s.points.length) return '';
        const line = s.points.map((p, i) => `${i === 0 ? 'M' : 'L'} ${x(p.day).toFixed(1)} ${y(p.percent).toFixed(1)}`).join(' ');
        const last = s.points[s.points.length - 1];
        const area = `${line} L ${x(last.day).toFixed(1)} ${y(0)} L ${x(s.points[0].day).toFixed(1)} ${y(0)} Z`;
        return `<path d="${area}" fill="${s.color}" fill-opacity="0.12" />
                <path d="${line}" fill="none" stroke="${s.color}" stroke-width="2" />`;
      }).join('');

      svg.innerHTML = stats.trend.length
        ? grid + series + labels
        : `<text x="50%" y="50%" text-anchor="middle">No habits in this view</text>`;
      $('trend-legend').innerHTML = stats.trend
        .map((s) => `<span><span class="badge" style="background:${s.color}"></span>${escapeHtml(s.title)}</span>`)
        .join('');
    };

    const renderGoals = (stats) => {
      $('goal-rows').innerHTML = stats.goals.map((g) => `
        <tr>
          <td>${escapeHtml(g.name)}</td>
          <td>${g.goal}</td>
          <td><strong>${g.actual}</strong></td>
          <td><div class="bar"><span style="width:${g.percent}%;background:${g.color}"></span></div></td>
        </tr>`).join('');
    };

    const renderRadar = (stats) => {
      const svg = $('radar-chart');
      const cx = 150, cy = 130, radius = 95;
      const count = stats.weekdays.length;
      const point = (index, pct) => {
        const angle = -Math.PI / 2 + (index * 2 * Math.PI) / count;
        const r = (radius * pct) / 100;
        return [cx + r * Math.cos(angle), cy + r * Math.sin(angle)];
      };
      let rings = '';
      [25, 50, 75, 100].forEach((pct) => {
        const pts = stats.weekdays.map((_, i) => point(i, pct).map((v) => v.toFixed(1)).join(',')).join(' ');
        rings += `<polygon points="${pts}" fill="none" stroke="var(--line)" />`;
      });
      const labels = stats.weekdays.map((w, i) => {
        const [lx, ly] = point(i, 118);
        return `<text x="${lx.toFixed(1)}" y="${(ly + 3).toFixed(1)}" text-anchor="middle">${w.weekday}</text>`;
      }).join('');
      const colour = stats.filter === 'break' ? 'var(--break)' : 'var(--build)';
      const shape = stats.weekdays.map((w, i) => point(i, w.percent).map((v) => v.toFixed(1)).join(',')).join(' ');
      svg.innerHTML = `${rings}<polygon points="${shape}" fill="${colour}" fill-opacity="0.2" stroke="${colour}" stroke-width="2" />${labels}`;
    };

    const renderPie = (stats) => {
      const svg = $('pie-chart');
      const { done, total } = stats.today;
      if (!total) {
        svg.innerHTML = `<text x="50%" y="50%" text-anchor="middle">Nothing to track today</text>`;
        $('pie-caption').textContent = '';
        return;
      }
      const cx = 120, cy = 100, r = 70;
      const circumference = 2 * Math.PI * r;
      const filled = (done / total) * circumference;
      svg.innerHTML = `
        <circle cx="${cx}" cy="${cy}" r="${r}" fill="none" stroke="var(--soft)" stroke-width="20" />
        <circle cx="${cx}" cy="${cy}" r="${r}" fill="none" stroke="var(--ink)" stroke-width="20"
                stroke-dasharray="${filled.toFixed(1)} ${circumference.toFixed(1)}" transform="rotate(-90 ${cx} ${cy})" />
        <text x="${cx}" y="${cy + 6}" text-anchor="middle" style="font-size:22px;fill:var(--ink)">${Math.round((done / total) * 100)}%</text>`;
      $('pie-caption').textContent = `${done} of ${total} done today`;
    };

    const renderStats = (stats) => {
      renderTrend(stats);
      renderGoals(stats);
      renderRadar(stats);
      renderPie(stats);
    };

    // --- boot ---
    (async () => {
      if (!state.token) {
        signedOut();
        return;
      }
      try {
        enterApp(await api('GET', '/api/session'));
      } catch (err) {
        signedOut();
      }
    })();
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BadgeStyle;

    #[test]
    fn render_embeds_config_and_theme() {
        let ui = UiConfig {
            dark_mode: true,
            badge_style: BadgeStyle::Icon,
            ..UiConfig::default()
        };
        let html = render_index(&ui);
        assert!(html.contains(r#"<html lang="en" class="dark">"#));
        assert!(html.contains(r#""badge_style":"icon""#));
        assert!(!html.contains("{{CONFIG}}"));
    }

    #[test]
    fn light_theme_leaves_class_empty() {
        let html = render_index(&UiConfig::default());
        assert!(html.contains(r#"<html lang="en" class="">"#));
        assert!(html.contains(r#""default_filter":"build""#));
    }

    #[test]
    fn page_sends_browser_date_on_date_sensitive_calls() {
        let html = render_index(&UiConfig::default());
        assert!(html.contains("/api/calendar?today=${today}"));
        assert!(html.contains("&today=${today}"));
        assert!(html.contains("today: localToday()"));
    }
}

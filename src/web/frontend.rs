//! Embedded HTML/CSS/JS frontend for the prism web dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies. The inspection
//! markup itself is rendered server-side by [`crate::render`]; this page
//! only collects the payload, mounts the returned fragment, and drives the
//! collapse toggles.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>prism Inspector</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

/* Layout */
.app {
  max-width: 1100px;
  margin: 0 auto;
  padding: 24px;
}

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 24px; font-weight: 600; }
header .sub { color: var(--text-muted); font-size: 13px; }

.badge {
  font-size: 12px;
  padding: 2px 10px;
  border-radius: 10px;
  border: 1px solid var(--border);
  color: var(--text-muted);
}
.badge.ok { color: var(--green); border-color: var(--green); }

/* Input card */
.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
  margin-bottom: 16px;
}

.controls {
  display: flex;
  align-items: center;
  gap: 12px;
  flex-wrap: wrap;
  margin-bottom: 12px;
}
.controls label { color: var(--text-muted); font-size: 13px; }
select, textarea {
  background: var(--bg);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  font-family: var(--mono);
  font-size: 13px;
}
select { padding: 6px 8px; }
textarea {
  width: 100%;
  min-height: 180px;
  padding: 10px;
  resize: vertical;
}
textarea:focus, select:focus { outline: none; border-color: var(--accent); }

.btn {
  background: var(--surface);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 6px 14px;
  cursor: pointer;
  font-size: 13px;
}
.btn:hover { border-color: var(--accent); color: var(--accent); }
.btn.primary { background: var(--accent); border-color: var(--accent); color: #0d1117; font-weight: 600; }
.btn.primary:hover { opacity: 0.9; color: #0d1117; }

.kind-tag {
  font-family: var(--mono);
  font-size: 12px;
  color: var(--text-muted);
}
.kind-tag.request { color: var(--green); }
.kind-tag.response, .kind-tag.streaming-response { color: var(--accent); }
.kind-tag.unrecognized { color: var(--yellow); }

/* Rendered inspection tree (same classes the server emits) */
.section {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  margin-bottom: 8px;
}
.section .section { margin: 8px; }
.section-header { padding: 8px 12px; cursor: pointer; font-weight: 600; }
.section-header:hover { color: var(--accent); }
.section-title { padding: 8px 12px; font-weight: 600; border-bottom: 1px solid var(--border); }
.section-body { padding: 8px 12px; }
.collapse-icon { color: var(--text-muted); margin-right: 4px; }
.stat { display: inline-block; min-width: 140px; margin: 4px 12px 4px 0; }
.stat-label { color: var(--text-muted); font-size: 12px; text-transform: uppercase; }
.stat-value { font-size: 18px; font-weight: 600; }
.kv { padding: 2px 0; }
.kv-label { color: var(--text-muted); margin-right: 8px; }
.code {
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 8px;
  overflow-x: auto;
  font-family: var(--mono);
  font-size: 13px;
  white-space: pre-wrap;
  word-break: break-word;
}
.preview { color: var(--text-muted); font-size: 13px; padding: 2px 0 6px; }
.alert {
  color: var(--red);
  border: 1px solid var(--red);
  border-radius: var(--radius);
  padding: 8px 12px;
  margin: 4px 0;
}
.errors .section-title { color: var(--red); }

.empty {
  color: var(--text-muted);
  text-align: center;
  padding: 32px;
}

/* Toast */
.toast {
  position: fixed;
  bottom: 24px;
  right: 24px;
  background: var(--surface);
  border: 1px solid var(--green);
  color: var(--text);
  border-radius: var(--radius);
  padding: 10px 16px;
  opacity: 0;
  transition: opacity 0.2s;
  pointer-events: none;
}
.toast.show { opacity: 1; }
.toast.error { border-color: var(--red); }
</style>
</head>
<body>
<div class="app">

  <header>
    <div>
      <h1>prism</h1>
      <div class="sub">request/response inspector for messages-API traffic</div>
    </div>
    <span class="badge" id="health-badge">checking…</span>
  </header>

  <div class="card">
    <div class="controls">
      <label for="kind">Payload</label>
      <select id="kind">
        <option value="">auto-detect</option>
        <option value="request">request</option>
        <option value="response">response</option>
        <option value="streaming-response">streaming response</option>
      </select>
      <label><input type="checkbox" id="newest-first"> newest first</label>
      <button class="btn primary" id="btn-inspect">Inspect</button>
      <button class="btn" id="btn-export">Export analysis</button>
      <button class="btn" id="btn-clear">Clear</button>
      <span class="kind-tag" id="detected-kind"></span>
    </div>
    <textarea id="payload" spellcheck="false"
      placeholder='Paste a captured request body, response body, or SSE stream here…'></textarea>
  </div>

  <div id="result">
    <div class="empty">Paste a payload and hit Inspect.</div>
  </div>

</div>

<!-- Toast -->
<div class="toast" id="toast"></div>

<script>
// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body !== undefined) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  return res.json();
}

function toast(msg, isError) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.className = 'toast show' + (isError ? ' error' : '');
  setTimeout(() => el.className = 'toast', 3000);
}

function inspectBody() {
  return {
    payload: document.getElementById('payload').value,
    kind: document.getElementById('kind').value || null,
    newest_first: document.getElementById('newest-first').checked,
  };
}

// ---------------------------------------------------------------------------
// Collapse toggling (section bodies are server-rendered)
// ---------------------------------------------------------------------------
function prismToggle(id) {
  const body = document.getElementById(id);
  const icon = document.getElementById(id + '-icon');
  if (!body) return;
  const hidden = body.style.display === 'none';
  body.style.display = hidden ? 'block' : 'none';
  if (icon) icon.textContent = hidden ? '▼' : '▶';
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------
document.getElementById('btn-inspect').addEventListener('click', async () => {
  const body = inspectBody();
  if (!body.payload.trim()) {
    toast('Nothing to inspect — payload is empty', true);
    return;
  }
  try {
    const data = await api('POST', '/api/inspect', body);
    if (data.error) {
      toast(data.error, true);
      return;
    }
    document.getElementById('result').innerHTML = data.html;
    const tag = document.getElementById('detected-kind');
    tag.textContent = data.kind;
    tag.className = 'kind-tag ' + data.kind;
  } catch (e) {
    toast('Inspection failed: ' + e.message, true);
  }
});

document.getElementById('btn-export').addEventListener('click', async () => {
  const body = inspectBody();
  if (!body.payload.trim()) {
    toast('Nothing to export — payload is empty', true);
    return;
  }
  try {
    const data = await api('POST', '/api/export', body);
    if (data.error) {
      toast(data.error, true);
      return;
    }
    const blob = new Blob([JSON.stringify(data, null, 2)], { type: 'application/json' });
    const url = URL.createObjectURL(blob);
    const link = document.createElement('a');
    link.href = url;
    link.download = 'prism-analysis-' + new Date().toISOString().slice(0, 19).replace(/:/g, '-') + '.json';
    link.click();
    URL.revokeObjectURL(url);
    toast('Analysis downloaded');
  } catch (e) {
    toast('Export failed: ' + e.message, true);
  }
});

document.getElementById('btn-clear').addEventListener('click', () => {
  document.getElementById('payload').value = '';
  document.getElementById('result').innerHTML = '<div class="empty">Paste a payload and hit Inspect.</div>';
  document.getElementById('detected-kind').textContent = '';
});

// ---------------------------------------------------------------------------
// Health badge
// ---------------------------------------------------------------------------
(async () => {
  const badge = document.getElementById('health-badge');
  try {
    const health = await api('GET', '/api/health');
    badge.textContent = 'v' + health.version;
    badge.classList.add('ok');
  } catch (e) {
    badge.textContent = 'offline';
  }
})();
</script>
</body>
</html>"##;

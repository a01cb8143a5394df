//! Static page assets.
//!
//! Injected verbatim into every page. Nothing request-derived belongs here.

pub const PAGE_TITLE: &str = "HTTP Reflector";

pub const PAGE_STYLE: &str = r#"
body { margin: 0; font-family: system-ui, -apple-system, "Segoe UI", sans-serif; background: #f4f5f7; color: #1f2933; }
main { max-width: 1100px; margin: 0 auto; padding: 1.5rem; }
header { display: flex; flex-wrap: wrap; justify-content: space-between; align-items: baseline; gap: 1rem; margin-bottom: 1rem; }
h1 { font-size: 1.5rem; margin: 0; }
h2 { font-size: 1rem; margin: 0; padding: 0.6rem 1rem; border-bottom: 1px solid #e4e7eb; background: #fafbfc; }
.muted { color: #7b8794; }
.stamp { font-size: 0.85rem; background: #e4e7eb; border-radius: 0.3rem; padding: 0.2rem 0.5rem; }
.banner { border-radius: 0.4rem; padding: 0.75rem 1rem; margin-bottom: 1rem; border: 1px solid transparent; }
.banner-info { background: #e0f2fe; border-color: #7dd3fc; }
.banner-success { background: #dcfce7; border-color: #86efac; }
.banner-warning { background: #fef9c3; border-color: #fde047; }
.banner-danger { background: #fee2e2; border-color: #fca5a5; }
.grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(420px, 1fr)); gap: 1rem; margin-bottom: 1rem; }
.card { background: #fff; border: 1px solid #e4e7eb; border-radius: 0.5rem; overflow: hidden; margin-bottom: 1rem; }
.grid .card { margin-bottom: 0; }
.card .body { padding: 0.75rem 1rem; }
dl { display: grid; grid-template-columns: max-content 1fr; gap: 0.3rem 1rem; margin: 0; font-size: 0.9rem; }
dt { color: #7b8794; }
dd { margin: 0; word-break: break-all; }
table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
th { text-align: left; vertical-align: top; padding: 0.3rem 0.75rem 0.3rem 0; white-space: nowrap; }
td { padding: 0.3rem 0; word-break: break-all; }
tr + tr th, tr + tr td { border-top: 1px solid #f0f2f4; }
.tag { display: inline-block; background: #e8eefc; border-radius: 0.25rem; padding: 0 0.35rem; margin: 0 0.25rem 0.2rem 0; }
pre { background: #0f172a; color: #e2e8f0; padding: 1rem; border-radius: 0.4rem; margin: 0; overflow-x: auto; white-space: pre-wrap; word-break: break-all; }
code, pre { font-family: ui-monospace, "SFMono-Regular", Menlo, monospace; font-size: 0.85rem; }
footer { font-size: 0.8rem; }
"#;

/// Browser-side collector.
///
/// Exits immediately when `window.__reflectorHasClientData` is set, which
/// the page does on the enriched render, so the payload is posted once per
/// page load.
pub const COLLECTOR_SCRIPT: &str = r#"(function () {
  "use strict";
  var banner = document.getElementById("status-banner");

  function setStatus(text, severity) {
    if (!banner) {
      return;
    }
    banner.textContent = text;
    banner.className = "banner banner-" + severity;
  }

  if (window.__reflectorHasClientData) {
    return;
  }
  if (typeof window.fetch !== "function") {
    setStatus("This browser has no fetch API; browser details were not collected.", "warning");
    return;
  }

  function numberOrNull(value) {
    return typeof value === "number" ? value : null;
  }

  function boolOrNull(value) {
    return typeof value === "boolean" ? value : null;
  }

  function storageKeyNames(name) {
    try {
      var store = window[name];
      if (!store) {
        return [];
      }
      var names = [];
      for (var i = 0; i < store.length; i += 1) {
        var key = store.key(i);
        if (key !== null) {
          names.push(key);
        }
      }
      return names;
    } catch (err) {
      return ["unavailable"];
    }
  }

  function preferredColorScheme() {
    if (!window.matchMedia) {
      return null;
    }
    if (window.matchMedia("(prefers-color-scheme: dark)").matches) {
      return "dark";
    }
    if (window.matchMedia("(prefers-color-scheme: light)").matches) {
      return "light";
    }
    return "no-preference";
  }

  function timezoneName() {
    try {
      return Intl.DateTimeFormat().resolvedOptions().timeZone || null;
    } catch (err) {
      return null;
    }
  }

  function connectionInfo(nav) {
    var conn = nav.connection || nav.mozConnection || nav.webkitConnection;
    if (!conn) {
      return null;
    }
    return {
      type: conn.type || null,
      effectiveType: conn.effectiveType || null,
      downlink: numberOrNull(conn.downlink),
      rtt: numberOrNull(conn.rtt),
      saveData: boolOrNull(conn.saveData)
    };
  }

  function collect() {
    var nav = window.navigator || {};
    var scr = window.screen || {};
    return {
      timestamp: new Date().toISOString(),
      location: window.location.href,
      referrer: document.referrer || null,
      userAgent: nav.userAgent || null,
      language: nav.language || null,
      languages: Array.isArray(nav.languages) ? nav.languages.slice() : [],
      platform: nav.platform || null,
      hardwareConcurrency: numberOrNull(nav.hardwareConcurrency),
      deviceMemory: numberOrNull(nav.deviceMemory),
      doNotTrack: nav.doNotTrack || window.doNotTrack || null,
      cookieEnabled: boolOrNull(nav.cookieEnabled),
      onLine: boolOrNull(nav.onLine),
      timezone: timezoneName(),
      timezoneOffsetMinutes: new Date().getTimezoneOffset(),
      screen: {
        width: numberOrNull(scr.width),
        height: numberOrNull(scr.height),
        availWidth: numberOrNull(scr.availWidth),
        availHeight: numberOrNull(scr.availHeight),
        colorDepth: numberOrNull(scr.colorDepth),
        pixelRatio: numberOrNull(window.devicePixelRatio)
      },
      viewport: {
        width: numberOrNull(window.innerWidth),
        height: numberOrNull(window.innerHeight)
      },
      colorScheme: preferredColorScheme(),
      historyLength: window.history ? window.history.length : null,
      connection: connectionInfo(nav),
      localStorageKeys: storageKeyNames("localStorage"),
      sessionStorageKeys: storageKeyNames("sessionStorage"),
      touch: {
        maxTouchPoints: numberOrNull(nav.maxTouchPoints),
        touchEvents: "ontouchstart" in window,
        pointerEvents: typeof window.PointerEvent !== "undefined"
      }
    };
  }

  function post() {
    setStatus("Collecting additional details from your browser...", "info");
    window.fetch("/collect", {
      method: "POST",
      credentials: "same-origin",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify(collect())
    }).then(function (response) {
      return response.text().then(function (text) {
        if (!response.ok) {
          throw new Error("server responded with " + response.status + ": " + text);
        }
        return text;
      });
    }).then(function (html) {
      document.open();
      document.write(html);
      document.close();
    }).catch(function (err) {
      var message = err && err.message ? err.message : String(err);
      setStatus("Failed to capture browser details: " + message, "danger");
    });
  }

  if (document.readyState === "loading") {
    document.addEventListener("DOMContentLoaded", post, { once: true });
  } else {
    post();
  }
})();"#;

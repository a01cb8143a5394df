//! HTML rendering of a [`RenderModel`].
//!
//! Every snapshot-derived or client-supplied string goes through
//! [`escape`] before it reaches the markup. The collector script is the
//! only text written unescaped.

use std::fmt::Write;

use chrono::SecondsFormat;

use super::assets::{COLLECTOR_SCRIPT, PAGE_STYLE, PAGE_TITLE};
use super::model::{KeyValues, RenderModel};
use crate::error::ReflectError;
use crate::reflection::TlsSummary;

/// Turns a render model into a complete HTML document.
pub trait Renderer: Send + Sync + 'static {
    fn render(&self, model: &RenderModel) -> Result<String, ReflectError>;
}

/// Built-in renderer. Holds only static assets, so one instance is shared
/// read-only by every request.
#[derive(Debug, Clone, Copy)]
pub struct HtmlRenderer {
    style: &'static str,
    script: &'static str,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self {
            style: PAGE_STYLE,
            script: COLLECTOR_SCRIPT,
        }
    }
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(text: &str) -> std::borrow::Cow<'_, str> {
    html_escape::encode_safe(text)
}

impl Renderer for HtmlRenderer {
    fn render(&self, model: &RenderModel) -> Result<String, ReflectError> {
        let snap = &model.snapshot;
        let mut out = String::with_capacity(16 * 1024);

        write!(
            out,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
             <meta charset=\"utf-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
             <title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n<main>\n",
            title = PAGE_TITLE,
            style = self.style,
        )?;

        write!(
            out,
            "<header><div><h1>{title}</h1>\
             <p class=\"muted\">Observing request from <code>{remote}</code></p></div>\
             <span class=\"stamp\">{stamp}</span></header>\n",
            title = PAGE_TITLE,
            remote = escape(&snap.remote_addr),
            stamp = snap.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;

        write!(
            out,
            "<div id=\"status-banner\" class=\"banner banner-{variant}\" role=\"status\">{message}</div>\n",
            variant = model.status.severity.as_str(),
            message = escape(model.status.message),
        )?;

        out.push_str("<section class=\"card\"><h2>Request Overview</h2><div class=\"body grid\"><dl>");
        definition(&mut out, "Method", &snap.method)?;
        definition(&mut out, "Protocol", &snap.protocol_version)?;
        definition(&mut out, "Scheme", &snap.scheme)?;
        definition(&mut out, "Host", &snap.host)?;
        definition(&mut out, "Request Target", &snap.request_target)?;
        out.push_str("</dl><dl>");
        definition(&mut out, "Remote Address", &snap.remote_addr)?;
        definition(&mut out, "Remote IP", &snap.remote_ip)?;
        definition(&mut out, "Remote Port", &snap.remote_port)?;
        definition(&mut out, "Content Length", &snap.content_length.to_string())?;
        out.push_str("<dt>Transfer Encoding</dt><dd>");
        if snap.transfer_encoding.is_empty() {
            out.push_str("<span class=\"muted\">none</span>");
        } else {
            for token in &snap.transfer_encoding {
                write!(out, "<span class=\"tag\">{}</span>", escape(token))?;
            }
        }
        out.push_str("</dd></dl></div></section>\n");

        out.push_str("<div class=\"grid\">");
        key_values_card(&mut out, "Headers", &model.headers, "No headers were supplied.")?;
        key_values_card(&mut out, "Query Parameters", &model.query, "No query parameters detected.")?;
        out.push_str("</div>\n<div class=\"grid\">");

        out.push_str("<section class=\"card\"><h2>Cookies</h2><div class=\"body\">");
        if snap.cookies.is_empty() {
            out.push_str("<p class=\"muted\">No cookies were provided.</p>");
        } else {
            out.push_str("<table><tbody>");
            for cookie in &snap.cookies {
                write!(
                    out,
                    "<tr><th scope=\"row\">{}</th><td><code>{}</code></td></tr>",
                    escape(&cookie.name),
                    escape(&cookie.value),
                )?;
            }
            out.push_str("</tbody></table>");
        }
        out.push_str("</div></section>");

        out.push_str("<section class=\"card\"><h2>TLS</h2><div class=\"body\">");
        match &snap.tls {
            Some(tls) => tls_details(&mut out, tls)?,
            None => out.push_str("<p class=\"muted\">Connection is not using TLS.</p>"),
        }
        out.push_str("</div></section></div>\n");

        write!(
            out,
            "<section class=\"card\"><h2>Request Body <span class=\"muted\">({} bytes captured)</span></h2><div class=\"body\">",
            snap.body_captured,
        )?;
        if snap.body_preview.is_empty() {
            out.push_str("<p class=\"muted\">No request body captured.</p>");
        } else {
            write!(out, "<pre>{}</pre>", escape(&snap.body_preview))?;
        }
        out.push_str("</div></section>\n");

        out.push_str("<section class=\"card\"><h2>Browser Metadata</h2><div class=\"body\">");
        match &model.client_json {
            Some(json) => write!(out, "<pre id=\"client-data\">{}</pre>", escape(json))?,
            None => out.push_str(
                "<p class=\"muted\">Waiting for the browser script to provide additional context...</p>",
            ),
        }
        out.push_str("</div></section>\n");

        out.push_str("<footer class=\"muted\">HTTP Reflector: request introspection for CDN and proxy debugging.</footer>\n</main>\n");

        write!(
            out,
            "<script>\nwindow.__reflectorHasClientData = {flag};\n{script}\n</script>\n</body>\n</html>\n",
            flag = model.has_client_data(),
            script = self.script,
        )?;

        Ok(out)
    }
}

fn definition(out: &mut String, term: &str, value: &str) -> std::fmt::Result {
    write!(out, "<dt>{}</dt><dd>{}</dd>", term, escape(value))
}

fn key_values_card(
    out: &mut String,
    title: &str,
    rows: &[KeyValues],
    empty: &str,
) -> std::fmt::Result {
    write!(out, "<section class=\"card\"><h2>{}</h2><div class=\"body\">", title)?;
    if rows.is_empty() {
        write!(out, "<p class=\"muted\">{}</p>", empty)?;
    } else {
        out.push_str("<table><tbody>");
        for row in rows {
            write!(out, "<tr><th scope=\"row\">{}</th><td>", escape(&row.key))?;
            for value in &row.values {
                write!(out, "<span class=\"tag\">{}</span>", escape(value))?;
            }
            out.push_str("</td></tr>");
        }
        out.push_str("</tbody></table>");
    }
    out.push_str("</div></section>");
    Ok(())
}

fn tls_details(out: &mut String, tls: &TlsSummary) -> std::fmt::Result {
    out.push_str("<dl>");
    definition(out, "Version", &tls.version)?;
    definition(out, "Cipher Suite", &tls.cipher_suite)?;
    for (term, value) in [("Server Name", &tls.server_name), ("ALPN", &tls.alpn)] {
        if value.is_empty() {
            write!(out, "<dt>{}</dt><dd><span class=\"muted\">n/a</span></dd>", term)?;
        } else {
            definition(out, term, value)?;
        }
    }
    out.push_str("</dl>");
    Ok(())
}

//! HTML output for downloaded weather plots.

use crate::models::WeatherEmbed;

/// Bokeh runtime loaded by the standalone weather page.
pub const BOKEH_JS: &str = "https://cdn.bokeh.org/bokeh/release/bokeh-0.12.10.min.js";
pub const BOKEH_CSS: &str = "https://cdn.bokeh.org/bokeh/release/bokeh-0.12.10.min.css";

/// Standalone page embedding a weather plot.
///
/// The service strips the `<script>` tags from the embed, so the script is
/// wrapped here. The div is inserted as delivered.
pub fn weather_page(title: &str, embed: &WeatherEmbed) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - mtcam</title>
    <link rel="stylesheet" href="{css}">
    <script src="{js}"></script>
    <style>{style}</style>
</head>
<body>
    <h1>{title}</h1>
    <div id="weather">
        {div}
    </div>
    <script type="text/javascript">
{script}
    </script>
</body>
</html>"#,
        title = html_escape(title),
        css = BOKEH_CSS,
        js = BOKEH_JS,
        style = CSS,
        div = embed.div,
        script = embed.script,
    )
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const CSS: &str = r#"
body {
    font-family: ui-monospace, "SF Mono", Menlo, monospace;
    color: #222;
    margin: 1.5rem;
}
h1 {
    font-size: 1.2rem;
    font-weight: normal;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_page_wraps_script() {
        let embed = WeatherEmbed {
            div: r#"<div class="bk-root" id="abc"></div>"#.into(),
            script: "Bokeh.embed('abc');".into(),
        };
        let page = weather_page("Mt. Hood <OR>", &embed);

        assert!(page.contains("<title>Mt. Hood &lt;OR&gt; - mtcam</title>"));
        assert!(page.contains(r#"<div class="bk-root" id="abc"></div>"#));
        assert!(page.contains("<script type=\"text/javascript\">\nBokeh.embed('abc');"));
        assert!(page.contains(BOKEH_JS));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape(r#"a & "b""#), "a &amp; &quot;b&quot;");
    }
}

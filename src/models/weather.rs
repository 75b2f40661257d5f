use serde::{Deserialize, Serialize};

/// Bokeh plot returned by the weather endpoint.
///
/// `div` is an HTML fragment and `script` the JavaScript that fills it,
/// without surrounding `<script>` tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherEmbed {
    pub div: String,
    pub script: String,
}

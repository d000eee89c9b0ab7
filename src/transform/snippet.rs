//! The client-side live reload script.

use bytes::Bytes;

/// Message the server pushes over the reload channel.
pub const RELOAD_MESSAGE: &str = "reload";

/// Delay before the client tries to reopen a closed reload channel.
const RECONNECT_DELAY_MS: u32 = 1000;

/// Script block inserted into every served HTML document.
///
/// Built once per server from the websocket endpoint path and shared by all
/// responses. The endpoint path is expected to have passed config validation
/// (plain URL characters only), since it is embedded in a JS string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet(Bytes);

impl Snippet {
    /// Build the snippet for a websocket endpoint such as `/__livereload`.
    pub fn for_endpoint(path: &str) -> Self {
        let script = format!(
            r#"<script>
(function () {{
  var scheme = location.protocol === "https:" ? "wss://" : "ws://";
  function connect() {{
    var socket = new WebSocket(scheme + location.host + "{path}");
    socket.onmessage = function (event) {{
      if (event.data === "{message}") {{
        location.reload();
      }}
    }};
    socket.onclose = function () {{
      setTimeout(connect, {delay});
    }};
  }}
  connect();
}})();
</script>"#,
            path = path,
            message = RELOAD_MESSAGE,
            delay = RECONNECT_DELAY_MS,
        );
        Self(Bytes::from(script))
    }

    /// Raw snippet bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Cheap shared handle to the snippet bytes.
    pub fn to_bytes(&self) -> Bytes {
        self.0.clone()
    }
}

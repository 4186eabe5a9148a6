//! Inline browser script for the open-app flow.
//!
//! This is the browser twin of [`crate::redirect::OpenAppFlow`]. The timeout
//! and the user-agent signatures are substituted from the Rust constants so
//! the two cannot drift.

use once_cell::sync::Lazy;

use crate::platform::{alternation, ANDROID_SIGNATURES, IN_APP_SIGNATURES, IOS_SIGNATURES};
use crate::redirect::{APP_OPEN_TIMEOUT, DESKTOP_NOTICE};

const TEMPLATE: &str = r#"
(function () {
  var OPEN_TIMEOUT_MS = __OPEN_TIMEOUT_MS__;
  var IOS_RE = /__IOS_PATTERN__/;
  var ANDROID_RE = /__ANDROID_PATTERN__/;
  var IN_APP_RE = /__IN_APP_PATTERN__/i;
  var DESKTOP_NOTICE = __DESKTOP_NOTICE__;

  var cfg = {};
  var flow = { state: "idle", env: null, timer: null, deadline: 0 };

  function byId(id) {
    return document.getElementById(id);
  }

  function classify(ua) {
    var platform = "desktop";
    if (IOS_RE.test(ua) && !window.MSStream) {
      platform = "ios";
    } else if (ANDROID_RE.test(ua)) {
      platform = "android";
    }
    return { platform: platform, inAppBrowser: IN_APP_RE.test(ua) };
  }

  function showPreview() {
    var preview = byId("preview");
    if (preview && preview.dataset.populated === "true") {
      preview.hidden = false;
    }
  }

  function showStoreCta() {
    byId("message").textContent =
      "To view this " + cfg.kind + ", please download or open the app:";
    byId("downloadButton").classList.add("highlight");
  }

  function showError(message) {
    var el = byId("errorMessage");
    el.textContent = message;
    el.hidden = false;
  }

  // OpenAppFlow::attempt_open
  function attemptOpen() {
    flow.state = "attempting";
    flow.deadline = Date.now() + OPEN_TIMEOUT_MS;
    byId("message").textContent = "Opening the app...";
    window.location.href = cfg.deepLink;
    flow.timer = setTimeout(timerFired, OPEN_TIMEOUT_MS);
  }

  // Terminal(ShowedStoreLink), shared by page_hidden and timer_fired.
  function expire() {
    flow.state = "storeLink";
    showStoreCta();
  }

  // OpenAppFlow::page_hidden
  function pageHidden() {
    if (flow.state !== "attempting") return;
    if (Date.now() < flow.deadline) {
      clearTimeout(flow.timer);
      flow.timer = null;
      flow.state = "opened";
    } else {
      expire();
    }
  }

  // OpenAppFlow::timer_fired
  function timerFired() {
    flow.timer = null;
    if (flow.state !== "attempting") return;
    if (document.hidden) {
      flow.state = "opened";
      return;
    }
    expire();
  }

  // OpenAppFlow::open_clicked
  function openClicked() {
    if (!flow.env) return;
    if (flow.state === "opened") {
      window.location.href = cfg.deepLink;
      return;
    }
    if (flow.state !== "storeLink") return;
    if (flow.env.inAppBrowser) {
      window.location.href = flow.env.platform === "ios" ? cfg.universalLink : cfg.deepLink;
      return;
    }
    attemptOpen();
  }

  // OpenAppFlow::store_clicked
  function storeClicked() {
    if (!flow.env) return;
    if (flow.env.platform === "android") {
      window.location.href = cfg.playStoreUrl;
    } else if (flow.env.platform === "ios") {
      window.location.href = cfg.appStoreUrl;
    } else {
      window.open(cfg.appStoreUrl, "_blank", "noopener");
    }
  }

  // OpenAppFlow::start
  function start() {
    if (flow.state !== "idle") return;
    flow.state = "detecting";
    try {
      cfg = JSON.parse(byId("shareConfig").dataset.config);
    } catch (e) {
      cfg = {};
    }
    flow.env = classify(navigator.userAgent || navigator.vendor || "");

    byId("openAppButton").addEventListener("click", openClicked);
    byId("downloadButton").addEventListener("click", storeClicked);

    if (!cfg.id) {
      flow.state = "error";
      showError("Error: " + (cfg.noun || "Link") + " ID is missing");
      return;
    }

    showPreview();

    if (flow.env.platform === "desktop") {
      flow.state = "error";
      byId("openAppButton").hidden = true;
      showError(DESKTOP_NOTICE);
      showStoreCta();
      return;
    }

    if (flow.env.inAppBrowser) {
      flow.state = "storeLink";
      showStoreCta();
      return;
    }

    attemptOpen();
  }

  document.addEventListener("visibilitychange", function () {
    if (document.hidden) pageHidden();
  });
  window.addEventListener("pagehide", pageHidden);
  window.addEventListener("blur", pageHidden);

  if (document.readyState === "loading") {
    document.addEventListener("DOMContentLoaded", start);
  } else {
    start();
  }
})();
"#;

static SCRIPT: Lazy<String> = Lazy::new(|| {
    TEMPLATE
        .replace(
            "__OPEN_TIMEOUT_MS__",
            &APP_OPEN_TIMEOUT.as_millis().to_string(),
        )
        .replace("__IOS_PATTERN__", &alternation(IOS_SIGNATURES))
        .replace("__ANDROID_PATTERN__", &alternation(ANDROID_SIGNATURES))
        .replace("__IN_APP_PATTERN__", &alternation(IN_APP_SIGNATURES))
        .replace(
            "__DESKTOP_NOTICE__",
            &serde_json::Value::from(DESKTOP_NOTICE).to_string(),
        )
});

/// The client script with all constants substituted.
pub fn client_script() -> &'static str {
    &SCRIPT
}

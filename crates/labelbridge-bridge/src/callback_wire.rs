// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Flat encoding of print-service callbacks as they cross the native boundary.
//
// Host glue forwards every vendor callback as `(kind, first, second, text)`:
//
//   kind                        first          second        text
//   sdkConnected                -              -             -
//   sdkDisconnected             -              -             -
//   recentPrintersInitialized   1 = installed  -             -
//   serviceConnected            -              -             -
//   serviceDisconnected         -              -             -
//   fileOpen                    progress       1 = finished  -
//   libraryDownload             progress       -             -
//   renderLibraryCheck          1 = render     1 = fonts     -
//   passwordRequired            -              -             -
//   error                       -              -             message
//   startingPrintJob            -              -             -
//   start                       -              -             -
//   sendingPage                 page           progress      -
//   preparePage                 page           -             -
//   needCancel                  -              -             -
//   finishingPrintJob           -              -             -
//   finish                      pages printed  -             result

use labelbridge_print::{CallbackReply, ServiceCallback};

fn count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Decode one forwarded callback. Unknown kinds yield `None`.
pub fn decode(kind: &str, first: i32, second: i32, text: String) -> Option<ServiceCallback> {
    let callback = match kind {
        "sdkConnected" => ServiceCallback::SdkConnected,
        "sdkDisconnected" => ServiceCallback::SdkDisconnected,
        "recentPrintersInitialized" => ServiceCallback::RecentPrintersInitialized {
            library_installed: first == 1,
        },
        "serviceConnected" => ServiceCallback::Connected,
        "serviceDisconnected" => ServiceCallback::Disconnected,
        "fileOpen" => ServiceCallback::FileOpen {
            progress: count(first),
            finished: second == 1,
        },
        "libraryDownload" => ServiceCallback::LibraryDownload {
            progress: count(first),
        },
        "renderLibraryCheck" => ServiceCallback::RenderLibraryCheck {
            render_library: first == 1,
            font_library: second == 1,
        },
        "passwordRequired" => ServiceCallback::PasswordRequired,
        "error" => ServiceCallback::Error(text),
        "startingPrintJob" => ServiceCallback::StartingJob,
        "start" => ServiceCallback::Started,
        "sendingPage" => ServiceCallback::SendingPage {
            page: count(first),
            progress: count(second),
        },
        "preparePage" => ServiceCallback::PreparingPage { page: count(first) },
        "needCancel" => ServiceCallback::NeedCancel,
        "finishingPrintJob" => ServiceCallback::FinishingJob,
        "finish" => ServiceCallback::Finished {
            result: text,
            pages_printed: count(first),
        },
        _ => return None,
    };
    Some(callback)
}

/// Reply handed back to the glue: `None` for void callbacks, `"true"` /
/// `"false"` for boolean ones, the password text otherwise.
pub fn encode_reply(reply: &CallbackReply) -> Option<String> {
    match reply {
        CallbackReply::Done => None,
        CallbackReply::Flag(flag) => Some(flag.to_string()),
        CallbackReply::Password(password) => Some(password.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_argument_carrying_callbacks() {
        assert_eq!(
            decode("recentPrintersInitialized", 0, 0, String::new()),
            Some(ServiceCallback::RecentPrintersInitialized {
                library_installed: false
            })
        );
        assert_eq!(
            decode("sendingPage", 2, 75, String::new()),
            Some(ServiceCallback::SendingPage {
                page: 2,
                progress: 75
            })
        );
        assert_eq!(
            decode("finish", 1, 0, "OK".into()),
            Some(ServiceCallback::Finished {
                result: "OK".into(),
                pages_printed: 1
            })
        );
        assert_eq!(
            decode("error", 0, 0, "RemoteException".into()),
            Some(ServiceCallback::Error("RemoteException".into()))
        );
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        assert_eq!(
            decode("libraryDownload", -1, 0, String::new()),
            Some(ServiceCallback::LibraryDownload { progress: 0 })
        );
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert_eq!(decode("onSomethingNew", 0, 0, String::new()), None);
    }

    #[test]
    fn replies_encode_for_glue() {
        assert_eq!(encode_reply(&CallbackReply::Done), None);
        assert_eq!(encode_reply(&CallbackReply::Flag(false)).as_deref(), Some("false"));
        assert_eq!(
            encode_reply(&CallbackReply::Password("password".into())).as_deref(),
            Some("password")
        );
    }
}

//! Deserialization of HTTP responses.
//!
//! With the `tracing` feature, fields a response type does not capture are logged as
//! warnings and failures are logged with the JSON path that broke, which makes API drift
//! visible without failing requests.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize `value`, warning about fields the target type ignores.
#[cfg(feature = "tracing")]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    use std::any::type_name;

    tracing::trace!(type_name = %type_name::<T>(), json = %value, "deserializing JSON");

    let mut ignored: Vec<String> = Vec::new();
    let result = serde_ignored::deserialize(&value, |path| ignored.push(path.to_string()));

    let parsed: T = match result {
        Ok(parsed) => parsed,
        Err(e) => {
            // Replay with path tracking only to report where it failed.
            if let Err(path_err) = serde_path_to_error::deserialize::<_, T>(&value) {
                let path = path_err.path().to_string();
                tracing::error!(
                    type_name = %type_name::<T>(),
                    %path,
                    value = %describe(value_at(&value, &path)),
                    error = %path_err.inner(),
                    "deserialization failed"
                );
            }
            return Err(e.into());
        }
    };

    for path in ignored {
        tracing::warn!(
            type_name = %type_name::<T>(),
            field = %path,
            value = %describe(value_at(&value, &path)),
            "unknown field in API response"
        );
    }

    Ok(parsed)
}

/// Pass-through deserialization when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub fn deserialize_with_warnings<T: DeserializeOwned>(value: Value) -> crate::Result<T> {
    Ok(serde_json::from_value(value)?)
}

/// Resolve a `serde_ignored` or `serde_path_to_error` path such as `items[3].title` or
/// `items.?.3.title` inside `value`. `?` segments mark `Option` layers and are skipped.
#[cfg(feature = "tracing")]
fn value_at<'value>(value: &'value Value, path: &str) -> Option<&'value Value> {
    path.split(['.', '[', ']'])
        .filter(|segment| !segment.is_empty() && *segment != "?")
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
            _ => None,
        })
}

#[cfg(feature = "tracing")]
fn describe(value: Option<&Value>) -> String {
    value.map_or_else(|| "<unable to retrieve>".to_owned(), Value::to_string)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Headline {
        signal: String,
        #[serde(default)]
        rank: Option<u32>,
    }

    #[test]
    fn deserializes_known_fields() {
        let headline: Headline =
            deserialize_with_warnings(json!({"signal": "BTC up", "rank": 2})).unwrap();
        assert_eq!(
            headline,
            Headline {
                signal: "BTC up".to_owned(),
                rank: Some(2)
            }
        );
    }

    #[test]
    fn unknown_fields_do_not_fail() {
        let headline: Headline =
            deserialize_with_warnings(json!({"signal": "BTC up", "brand_new": true})).unwrap();
        assert_eq!(headline.rank, None);
    }

    #[test]
    fn missing_required_field_fails() {
        deserialize_with_warnings::<Headline>(json!({"rank": 1})).unwrap_err();
    }

    #[test]
    fn deserializes_arrays() {
        let items: Vec<Headline> =
            deserialize_with_warnings(json!([{"signal": "a"}, {"signal": "b"}])).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn value_at_follows_both_path_styles() {
        let value = json!({"items": [{"title": "first"}, {"title": "second"}]});

        assert_eq!(value_at(&value, "items[1].title"), Some(&json!("second")));
        assert_eq!(value_at(&value, "items.?.0.title"), Some(&json!("first")));
        assert_eq!(value_at(&value, ""), Some(&value));
        assert_eq!(value_at(&value, "items.9"), None);
        assert_eq!(value_at(&value, "items.0.title.deeper"), None);
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn warning_is_emitted_for_unknown_fields() {
        use std::io;
        use std::sync::{Arc, Mutex};

        use tracing_subscriber::layer::SubscriberExt as _;

        #[derive(Clone)]
        struct Capture(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Capture {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let capture = Capture(Arc::new(Mutex::new(Vec::new())));
        let writer = capture.clone();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .with_writer(move || writer.clone())
                .with_ansi(false),
        );

        tracing::subscriber::with_default(subscriber, || {
            let _headline: Headline =
                deserialize_with_warnings(json!({"signal": "x", "surprise_field": 1})).unwrap();
        });

        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("unknown field"), "got: {output}");
        assert!(output.contains("surprise_field"), "got: {output}");
    }
}

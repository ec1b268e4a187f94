// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Unwraps trigger events into the S3 objects they announce.
//!
//! Accepted shapes: S3 notifications, SQS messages whose body is an S3 notification
//! or an EventBridge "Object Created" event, SNS messages wrapping an S3
//! notification, and bare EventBridge events.

use serde::Deserialize;
use tracing::debug;

use crate::errors::TriggerError;

/// Envelopes nest at most SNS in SQS in the shapes AWS produces.
const MAX_NESTING: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Object {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(rename = "Records", default)]
    records: Vec<EnvelopeRecord>,
    #[serde(default)]
    detail: Option<ObjectRef>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeRecord {
    #[serde(default)]
    s3: Option<ObjectRef>,
    #[serde(default)]
    body: Option<String>,
    #[serde(rename = "Sns", default)]
    sns: Option<SnsMessage>,
}

#[derive(Debug, Deserialize)]
struct SnsMessage {
    #[serde(rename = "Message")]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ObjectRef {
    bucket: BucketRef,
    object: KeyRef,
}

#[derive(Debug, Deserialize)]
struct BucketRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct KeyRef {
    key: String,
}

/// S3 notifications form-encode keys.
fn decode_key(key: &str) -> String {
    let key = key.replace('+', " ");
    match urlencoding::decode(&key) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => key,
    }
}

fn collect(envelope: Envelope, depth: usize, objects: &mut Vec<S3Object>) {
    if let Some(detail) = envelope.detail {
        objects.push(S3Object {
            bucket: detail.bucket.name,
            key: detail.object.key,
        });
    }

    for record in envelope.records {
        if let Some(s3) = record.s3 {
            objects.push(S3Object {
                bucket: s3.bucket.name,
                key: decode_key(&s3.object.key),
            });
            continue;
        }

        let nested = record.body.or_else(|| record.sns.map(|sns| sns.message));
        let Some(nested) = nested else {
            continue;
        };
        if depth >= MAX_NESTING {
            debug!("Ignoring trigger record nested too deeply");
            continue;
        }
        match serde_json::from_str::<Envelope>(&nested) {
            Ok(inner) => collect(inner, depth + 1, objects),
            Err(err) => debug!("Ignoring trigger record with unrecognised body: {err}"),
        }
    }
}

/// Returns every announced object, in event order.
pub fn extract_objects(event: &str) -> Result<Vec<S3Object>, TriggerError> {
    let envelope: Envelope = serde_json::from_str(event)?;
    let mut objects = Vec::new();
    collect(envelope, 0, &mut objects);
    if objects.is_empty() {
        return Err(TriggerError::NoObjects);
    }
    debug!("Trigger announced {} objects", objects.len());
    Ok(objects)
}

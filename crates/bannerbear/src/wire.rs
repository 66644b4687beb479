//! Request and response bodies of the Bannerbear v2 `images` endpoints, and the
//! mapping from HTTP failures onto [`RenderError`].

use imaging::{JobStatus, JobUid, ModificationSet, RenderError, TemplateId};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// `POST /images` body.
#[derive(Debug, Serialize)]
pub(crate) struct CreateImageRequest<'a> {
    pub template: &'a str,
    pub modifications: &'a ModificationSet,
}

/// `POST /images` response.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedImage {
    pub uid: String,
    #[serde(default)]
    pub status: Option<RemoteStatus>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `GET /images/{uid}` response.
#[derive(Debug, Deserialize)]
pub(crate) struct ImageState {
    pub status: RemoteStatus,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum RemoteStatus {
    Pending,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ImageState {
    /// Converts to the domain status. Statuses this client does not recognise
    /// are reported as pending.
    pub(crate) fn into_job_status(self) -> JobStatus {
        match self.status {
            RemoteStatus::Completed => JobStatus::Completed {
                image_url: self.image_url.filter(|url| !url.is_empty()),
            },
            RemoteStatus::Failed => JobStatus::Failed { error: self.error },
            RemoteStatus::Pending | RemoteStatus::Unknown => JobStatus::Pending,
        }
    }
}

/// Which call produced a failing response; decides how a 404 is reported.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Call<'a> {
    Submit(&'a TemplateId),
    Status(&'a JobUid),
}

/// Maps a non-success HTTP response onto the per-job error taxonomy.
pub(crate) fn classify(status: StatusCode, body: &str, call: Call<'_>) -> RenderError {
    match status {
        StatusCode::UNAUTHORIZED => RenderError::Auth,
        StatusCode::NOT_FOUND => match call {
            Call::Submit(template_id) => RenderError::TemplateNotFound {
                template_id: template_id.to_string(),
            },
            Call::Status(uid) => RenderError::JobNotFound {
                uid: uid.to_string(),
            },
        },
        StatusCode::UNPROCESSABLE_ENTITY => RenderError::Validation {
            message: error_message(status, body),
        },
        _ => RenderError::Transient {
            status: Some(status.as_u16()),
            message: error_message(status, body),
        },
    }
}

/// Best available description of a failed response: the JSON `message` field,
/// then the raw body, then the status reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(ErrorBody {
        message: Some(message),
    }) = serde_json::from_str::<ErrorBody>(body)
    {
        if !message.trim().is_empty() {
            return message;
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

/// Parses a success body, reporting malformed JSON as an invalid response.
pub(crate) fn parse<'de, T: Deserialize<'de>>(body: &'de str) -> Result<T, RenderError> {
    serde_json::from_str(body).map_err(|err| RenderError::InvalidResponse {
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use imaging::{LayerName, Modification};

    use super::*;

    fn template() -> TemplateId {
        TemplateId::new("Kp21rAZj1y3eb6eLnd").unwrap()
    }

    fn uid() -> JobUid {
        JobUid::new("img_123").unwrap()
    }

    #[test]
    fn unauthorized_is_an_auth_error() {
        let err = classify(StatusCode::UNAUTHORIZED, "", Call::Submit(&template()));
        assert_eq!(err, RenderError::Auth);
    }

    #[test]
    fn not_found_depends_on_the_call() {
        let on_submit = classify(StatusCode::NOT_FOUND, "", Call::Submit(&template()));
        assert_eq!(
            on_submit,
            RenderError::TemplateNotFound {
                template_id: "Kp21rAZj1y3eb6eLnd".into()
            }
        );

        let on_status = classify(StatusCode::NOT_FOUND, "", Call::Status(&uid()));
        assert_eq!(
            on_status,
            RenderError::JobNotFound {
                uid: "img_123".into()
            }
        );
    }

    #[test]
    fn validation_error_carries_service_message() {
        let err = classify(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"Modification 'badge' does not match any layer"}"#,
            Call::Submit(&template()),
        );
        assert_eq!(
            err,
            RenderError::Validation {
                message: "Modification 'badge' does not match any layer".into()
            }
        );
    }

    #[test]
    fn other_statuses_are_transient() {
        let err = classify(
            StatusCode::BAD_GATEWAY,
            "upstream timeout",
            Call::Status(&uid()),
        );
        assert_eq!(
            err,
            RenderError::Transient {
                status: Some(502),
                message: "upstream timeout".into()
            }
        );

        let empty = classify(StatusCode::TOO_MANY_REQUESTS, "", Call::Status(&uid()));
        assert_eq!(
            empty,
            RenderError::Transient {
                status: Some(429),
                message: "Too Many Requests".into()
            }
        );
    }

    #[test]
    fn create_request_uses_wire_shape() {
        let mut modifications = ModificationSet::new();
        modifications.insert(Modification::text(LayerName::new("headline").unwrap(), "Hi"));
        modifications.insert(Modification::image(
            LayerName::new("logo").unwrap(),
            "https://cdn.example.com/logo.svg",
        ));
        let template = template();

        let body = serde_json::to_value(CreateImageRequest {
            template: template.as_str(),
            modifications: &modifications,
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "template": "Kp21rAZj1y3eb6eLnd",
                "modifications": [
                    {"name": "headline", "text": "Hi"},
                    {"name": "logo", "image_url": "https://cdn.example.com/logo.svg"}
                ]
            })
        );
    }

    #[test]
    fn created_image_parses_service_response() {
        let created: CreatedImage = parse(
            r#"{"uid":"img_123","status":"pending","created_at":"2024-05-01T10:00:00.000Z","self":"https://api.bannerbear.com/v2/images/img_123"}"#,
        )
        .unwrap();
        assert_eq!(created.uid, "img_123");
        assert_eq!(created.status, Some(RemoteStatus::Pending));
        assert_eq!(created.created_at.as_deref(), Some("2024-05-01T10:00:00.000Z"));
    }

    #[test]
    fn image_state_maps_to_job_status() {
        let completed: ImageState =
            parse(r#"{"uid":"img_123","status":"completed","image_url":"https://cdn/x.png"}"#)
                .unwrap();
        assert_eq!(
            completed.into_job_status(),
            JobStatus::Completed {
                image_url: Some("https://cdn/x.png".into())
            }
        );

        let failed: ImageState =
            parse(r#"{"uid":"img_123","status":"failed","image_url":null,"error":"layer not found"}"#)
                .unwrap();
        assert_eq!(
            failed.into_job_status(),
            JobStatus::Failed {
                error: Some("layer not found".into())
            }
        );

        let unknown: ImageState = parse(r#"{"status":"rendering","image_url":null}"#).unwrap();
        assert_eq!(unknown.into_job_status(), JobStatus::Pending);
    }

    #[test]
    fn malformed_body_is_an_invalid_response() {
        let err = parse::<ImageState>("<html>").unwrap_err();
        assert!(matches!(err, RenderError::InvalidResponse { .. }));
    }
}

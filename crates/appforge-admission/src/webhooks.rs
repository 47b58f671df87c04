//! Admission webhook handlers for [`Component`] objects.
//!
//! The handlers translate between the AdmissionReview wire format and the
//! rules in [`crate::component`]. Serving the handlers over HTTPS and wiring
//! up TLS is left to the binary embedding them.

use std::error::Error;

use appforge_crds::component::Component;
use kube::core::{
    DynamicObject,
    admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation},
};

use crate::component;

/// Handles a complete [`AdmissionReview`] posted to the mutating component
/// webhook endpoint.
pub fn review_mutating(review: AdmissionReview<Component>) -> AdmissionReview<DynamicObject> {
    let request: AdmissionRequest<Component> = match review.try_into() {
        Ok(request) => request,
        Err(err) => {
            return AdmissionResponse::invalid(format!("failed to convert to request: {err}"))
                .into_review();
        }
    };

    mutate(&request).into_review()
}

/// Handles a complete [`AdmissionReview`] posted to the validating component
/// webhook endpoint.
pub fn review_validating(review: AdmissionReview<Component>) -> AdmissionReview<DynamicObject> {
    let request: AdmissionRequest<Component> = match review.try_into() {
        Ok(request) => request,
        Err(err) => {
            return AdmissionResponse::invalid(format!("failed to convert to request: {err}"))
                .into_review();
        }
    };

    validate(&request).into_review()
}

/// Handles an admission request for the mutating component webhook.
///
/// Applies [`component::default`] to the submitted object and returns the
/// resulting change as a JSON patch. Defaulting never denies a request, an
/// invalid response only occurs when the patch cannot be serialized.
pub fn mutate(request: &AdmissionRequest<Component>) -> AdmissionResponse {
    let response = AdmissionResponse::from(request);

    // DELETE requests carry no object, there is nothing to default.
    let Some(component) = &request.object else {
        return response;
    };

    let mut defaulted = component.clone();
    component::default(&mut defaulted);

    let patch = match default_patch(component, &defaulted) {
        Ok(patch) => patch,
        Err(err) => {
            tracing::error!(
                error = &err as &dyn Error,
                "failed to compute component default patch"
            );
            return AdmissionResponse::invalid(format!("failed to compute default patch: {err}"));
        }
    };

    if patch.0.is_empty() {
        return response;
    }

    tracing::info!(
        k8s.component.name = request.name,
        patch.operations = patch.0.len(),
        "patching component with defaults"
    );

    match response.with_patch(patch) {
        Ok(response) => response,
        Err(err) => {
            tracing::error!(
                error = &err as &dyn Error,
                "failed to serialize component default patch"
            );
            AdmissionResponse::invalid(format!("failed to serialize default patch: {err}"))
        }
    }
}

/// Handles an admission request for the validating component webhook.
///
/// CREATE and UPDATE requests carry the submitted object, DELETE requests only
/// carry the stored revision. CONNECT requests are never routed to this
/// webhook and pass through unchecked.
pub fn validate(request: &AdmissionRequest<Component>) -> AdmissionResponse {
    let response = AdmissionResponse::from(request);

    let verdict = match request.operation {
        Operation::Create => {
            let Some(component) = &request.object else {
                return AdmissionResponse::invalid("CREATE request contains no object");
            };

            component::validate_create(component)
        }
        Operation::Update => {
            let Some(component) = &request.object else {
                return AdmissionResponse::invalid("UPDATE request contains no object");
            };

            component::validate_update(component, request.old_object.as_ref())
        }
        Operation::Delete => {
            let Some(component) = &request.old_object else {
                return AdmissionResponse::invalid("DELETE request contains no old object");
            };

            component::validate_delete(component)
        }
        Operation::Connect => Ok(()),
    };

    match verdict {
        Ok(()) => {
            tracing::info!(
                k8s.component.name = request.name,
                operation = ?request.operation,
                "admitting component"
            );

            response
        }
        Err(err) => {
            let reason = full_reason(&err);
            tracing::warn!(
                k8s.component.name = request.name,
                operation = ?request.operation,
                reason,
                "denying component"
            );

            response.deny(reason)
        }
    }
}

/// Computes the JSON patch which turns `component` into `defaulted`.
fn default_patch(
    component: &Component,
    defaulted: &Component,
) -> Result<json_patch::Patch, serde_json::Error> {
    let old = serde_json::to_value(component)?;
    let new = serde_json::to_value(defaulted)?;

    Ok(json_patch::diff(&old, &new))
}

/// Walks the whole error chain, so the client sees the full rejection reason.
fn full_reason(err: &dyn Error) -> String {
    use std::fmt::Write;

    let mut buf = err.to_string();
    let mut err: &dyn Error = err;
    while let Some(source) = err.source() {
        write!(buf, ": {source}").expect("failed to write rejection reason into string buffer");
        err = source;
    }

    buf
}

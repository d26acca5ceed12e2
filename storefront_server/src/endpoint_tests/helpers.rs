use actix_web::{
    body::to_bytes,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use log::debug;

use crate::{config::StaffAccess, middleware::STAFF_TOKEN_HEADER};

pub const STAFF_TOKEN: &str = "8c1f0e3b-staff-only";

/// Runs a single request against an app built by `configure`. Errors raised by middleware are turned into responses,
/// the same way the server would.
pub async fn send(req: TestRequest, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let app = App::new().app_data(web::Data::new(StaffAccess::with_token(STAFF_TOKEN))).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => res.into_parts().1.map_into_boxed_body(),
        Err(e) => e.error_response(),
    };
    let status = res.status();
    let bytes = to_bytes(res.into_body()).await.expect("Could not read response body");
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

pub fn as_staff(req: TestRequest) -> TestRequest {
    req.insert_header((STAFF_TOKEN_HEADER, STAFF_TOKEN))
}

pub fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("Response is not valid JSON")
}

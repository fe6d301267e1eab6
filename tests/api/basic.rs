use crate::helper::spawn_app;

#[actix_web::test]
async fn health_check_works() {
    let app = spawn_app().await;
    let response = reqwest::Client::new()
        .get(app.path("health_check"))
        .send()
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status(), 200);
}

#[actix_web::test]
async fn index_serves_the_client_page() {
    let app = spawn_app().await;
    let response = reqwest::get(app.base_address())
        .await
        .expect("Failed to execute request.");
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("<!DOCTYPE html>"));
    assert!(body.contains("RTCPeerConnection"));
}

// Define data modules
mod models; // Data structures (Task, Priority, ScheduleRequest, etc.)
mod score; // Scoring and deadline-feasibility logic
mod slots; // Time-slot search over occupied intervals
mod scheduler; // Core scheduling loop with bumping
mod store; // Task repository (in-memory)
mod service; // Resolves requests, runs the scheduler, writes results back
mod routes_tasks; // HTTP handlers for task CRUD
mod routes_schedule; // HTTP handler for the scheduling API

use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;

use store::AppState;

#[tokio::main]
async fn main() {
    let state = AppState::new();

    let api = Router::new()
        // schedule
        .route("/schedule", post(routes_schedule::post_schedule))
        // tasks
        .route(
            "/tasks",
            get(routes_tasks::get_tasks).post(routes_tasks::create_task),
        )
        .route(
            "/tasks/:id",
            put(routes_tasks::update_task).delete(routes_tasks::delete_task),
        )
        .with_state(state);

    let app = Router::new().nest("/api", api);

    let addr: SocketAddr = "127.0.0.1:3000".parse().unwrap();

    // Print the link to the server
    println!("  Server running at http://{}", addr);
    println!("  API base:        http://{}/api", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind failed");

    axum::serve(listener, app).await.expect("server error");
}

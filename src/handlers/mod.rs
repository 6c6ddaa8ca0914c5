pub mod contracts;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Contract routes (all protected, require valid JWT) ──
    // Fixed segments are registered before `/{id}` so they are not parsed as ids.
    cfg.service(
        web::scope("/contracts")
            .route("", web::get().to(contracts::get_contracts))
            .route("", web::post().to(contracts::create_contract))
            .route("/upcoming", web::get().to(contracts::get_upcoming_contracts))
            .route("/statistics", web::get().to(contracts::get_statistics))
            .route(
                "/validate_schedule",
                web::post().to(contracts::validate_schedule),
            )
            .route("/{id}", web::get().to(contracts::get_contract))
            .route("/{id}", web::put().to(contracts::update_contract))
            .route("/{id}", web::patch().to(contracts::update_contract))
            .route("/{id}", web::delete().to(contracts::delete_contract))
            .route("/{id}/confirm", web::post().to(contracts::confirm_contract))
            .route("/{id}/cancel", web::post().to(contracts::cancel_contract))
            .route("/{id}/start", web::post().to(contracts::start_contract))
            .route("/{id}/complete", web::post().to(contracts::complete_contract))
            .route("/{id}/restore", web::post().to(contracts::restore_contract))
            .route(
                "/{id}/validate_schedule",
                web::get().to(contracts::validate_contract_schedule),
            ),
    );
}

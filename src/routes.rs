use crate::{
    api::{attendance, settings, stats, vacation},
    config::Config,
};
use actix_governor::{
    governor::middleware::NoOpMiddleware, Governor, GovernorConfigBuilder, PeerIpKeyExtractor,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let scan_limiter = Arc::new(build_limiter(config.rate_scan_per_min));
    let dashboard_limiter = Arc::new(build_limiter(config.rate_dashboard_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/attendance")
                    // /attendance/scan
                    .service(
                        web::resource("/scan")
                            .wrap(scan_limiter.clone())
                            .route(web::post().to(attendance::submit_scan)),
                    )
                    // /attendance/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(attendance::edit_scan))
                            .route(web::delete().to(attendance::delete_scan)),
                    ),
            )
            .service(
                web::scope("/vacation")
                    // /vacation
                    .service(
                        web::resource("")
                            .route(web::get().to(vacation::vacation_list))
                            .route(web::post().to(vacation::create_vacation)),
                    )
                    // /vacation/{id}
                    .service(web::resource("/{id}").route(web::get().to(vacation::get_vacation)))
                    // /vacation/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(vacation::approve_vacation)),
                    )
                    // /vacation/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(vacation::reject_vacation)),
                    ),
            )
            .service(
                web::scope("/stats")
                    .wrap(dashboard_limiter)
                    .service(
                        web::resource("/group/{group_id}/daily")
                            .route(web::get().to(stats::group_daily)),
                    )
                    .service(
                        web::resource("/group/{group_id}/range")
                            .route(web::get().to(stats::group_range)),
                    )
                    .service(
                        web::resource("/group/{group_id}/week/{week}")
                            .route(web::get().to(stats::group_week)),
                    )
                    .service(
                        web::resource("/user/{user_id}/daily")
                            .route(web::get().to(stats::user_daily)),
                    ),
            )
            .service(
                web::scope("/group").service(
                    web::resource("/{id}/settings")
                        .route(web::get().to(settings::get_settings))
                        .route(web::put().to(settings::put_settings)),
                ),
            ),
    );
}

// SCAN FLOW
//  ├─ decode QR payload (session JSON or bare code)
//  ├─ validate: expiry / registered location / geolocation
//  └─ append one event row

// DASHBOARD FLOW
//  └─ read events + vacations → classify per user-day → bucket counts

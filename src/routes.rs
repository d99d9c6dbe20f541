use crate::{
    api::{company, employee, export, punch, time_record},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;

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

    let punch_limiter = build_limiter(config.rate_punch_per_min);
    let admin_limiter = build_limiter(config.rate_admin_per_min);

    // Public punch terminal route; rate limited so codes cannot be
    // brute-forced at interactive speed
    cfg.service(
        web::resource("/punch")
            .wrap(punch_limiter)
            .route(web::post().to(punch::punch)),
    );

    // Admin routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(admin_limiter) // rate limiting
            .service(
                web::scope("/companies")
                    // /companies
                    .service(
                        web::resource("")
                            .route(web::post().to(company::create_company))
                            .route(web::get().to(company::list_companies)),
                    )
                    // /companies/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(company::get_company))
                            .route(web::put().to(company::update_company))
                            .route(web::delete().to(company::delete_company)),
                    ),
            )
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/time-records")
                    // /time-records
                    .service(
                        web::resource("")
                            .route(web::get().to(time_record::list_time_records)),
                    )
                    // /time-records/export — must register before /{id}
                    .service(
                        web::resource("/export")
                            .route(web::get().to(export::export_time_records)),
                    )
                    // /time-records/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(time_record::get_time_record))
                            .route(web::put().to(time_record::update_time_record))
                            .route(web::delete().to(time_record::delete_time_record)),
                    ),
            ),
    );
}

use crate::{
    api::{absence, cash, client, employee, job, payroll, schedule, tax_config},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
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

    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));
    let payroll_limiter = Arc::new(build_limiter(config.rate_payroll_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/clients")
                    // /clients
                    .service(
                        web::resource("")
                            .route(web::post().to(client::create_client))
                            .route(web::get().to(client::list_clients)),
                    )
                    // /clients/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(client::get_client))
                            .route(web::put().to(client::update_client))
                            .route(web::delete().to(client::delete_client)),
                    ),
            )
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/jobs")
                    .service(
                        web::resource("")
                            .route(web::post().to(job::create_job))
                            .route(web::get().to(job::list_jobs)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(job::get_job))
                            .route(web::put().to(job::reschedule_job)),
                    )
                    // /jobs/{id}/cancel
                    .service(web::resource("/{id}/cancel").route(web::put().to(job::cancel_job)))
                    // /jobs/{id}/complete
                    .service(
                        web::resource("/{id}/complete").route(web::put().to(job::complete_job)),
                    ),
            )
            .service(
                web::scope("/schedule")
                    .service(web::resource("/validate").route(web::post().to(schedule::validate)))
                    .service(
                        web::resource("/available-cleaners")
                            .route(web::get().to(schedule::available_cleaners)),
                    ),
            )
            .service(
                web::scope("/absences")
                    .service(
                        web::resource("")
                            .route(web::get().to(absence::absence_list))
                            .route(web::post().to(absence::create_absence)),
                    )
                    .service(web::resource("/{id}").route(web::get().to(absence::get_absence)))
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(absence::approve_absence)),
                    )
                    .service(
                        web::resource("/{id}/reject").route(web::put().to(absence::reject_absence)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    // generation is heavier than the rest, own limiter
                    .service(
                        web::resource("/generate")
                            .wrap(payroll_limiter)
                            .route(web::post().to(payroll::generate_payroll)),
                    )
                    .service(web::resource("").route(web::get().to(payroll::list_periods)))
                    .service(web::resource("/{id}").route(web::get().to(payroll::get_period)))
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(payroll::approve_period)),
                    )
                    .service(web::resource("/{id}/pay").route(web::put().to(payroll::mark_paid)))
                    .service(
                        web::resource("/{id}/reminder")
                            .route(web::get().to(payroll::period_reminder)),
                    ),
            )
            .service(
                web::scope("/cash")
                    .service(web::resource("").route(web::get().to(cash::cash_list)))
                    .service(web::resource("/{id}").route(web::get().to(cash::get_cash)))
                    .service(
                        web::resource("/{id}/approve").route(web::put().to(cash::approve_cash)),
                    )
                    .service(
                        web::resource("/{id}/dispute").route(web::put().to(cash::dispute_cash)),
                    ),
            )
            .service(
                web::scope("/tax-config").service(
                    web::resource("/{year}")
                        .route(web::get().to(tax_config::get_tax_config))
                        .route(web::put().to(tax_config::upsert_tax_config)),
                ),
            ),
    );
}

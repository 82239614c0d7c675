use crate::configuration::{DispatchSettings, Settings};
use crate::document_store::{DocumentStore, FirestoreClient};
use crate::push_client::{PushClient, PushProvider};
use crate::routes;
use actix_web::{dev::Server, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let store_settings = configuration.document_store;
        let timeout = store_settings.timeout();
        let document_store = FirestoreClient::new(
            store_settings.base_url,
            store_settings.project_id,
            store_settings.access_token,
            timeout,
        )?;

        let push_settings = configuration.push_provider;
        let timeout = push_settings.timeout();
        let push_client = PushClient::new(
            push_settings.base_url,
            push_settings.project_id,
            push_settings.access_token,
            timeout,
        )?;

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)?;
        //Retrieve the port assigned to us by the OS
        let port = listener.local_addr()?.port();
        let server = run(
            listener,
            Arc::new(document_store),
            Arc::new(push_client),
            configuration.dispatch,
        )?;

        // We "save" the bound port in one of `Application`'s fields.
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// A more expressive name that makes it clear that this function only returns when the application
    /// is stopped.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

/// Both gateways come in as trait objects: the handlers never know whether they are talking to
/// Firestore and FCM or to something standing in for them.
pub fn run(
    listener: TcpListener,
    document_store: Arc<dyn DocumentStore>,
    push_provider: Arc<dyn PushProvider>,
    dispatch_settings: DispatchSettings,
) -> Result<Server, std::io::Error> {
    let document_store = web::Data::from(document_store);
    let push_provider = web::Data::from(push_provider);
    let dispatch_settings = web::Data::new(dispatch_settings);
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(routes::health_check))
            .route(
                "/enviar-notificacion-oferta",
                web::post().to(routes::send_offer_notification),
            )
            .app_data(web::JsonConfig::default().error_handler(routes::json_error_handler))
            .app_data(document_store.clone())
            .app_data(push_provider.clone())
            .app_data(dispatch_settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

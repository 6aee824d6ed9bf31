#![forbid(unsafe_code)]

use anyhow::Result;
use lazy_static::lazy_static;
use log::info;
use poem::listener::{Listener, RustlsCertificate, RustlsConfig};
use poem::middleware::Cors;
use poem::{listener::TcpListener, Endpoint, EndpointExt, Route};
use poem_openapi::OpenApiService;

// Numclass Utilities
use crate::api::classify_number::ClassifyNumberApi;
use crate::api::root::RootApi;
use crate::api::version::VersionApi;
use crate::utils::config::{init_log, init_runtime_context, Config, RuntimeCtx, NUMCLASS_ARGS, NUMCLASS_DIRS};
use crate::utils::errors::Errors;
use crate::utils::fun_facts::FunFactClient;

// Modules
mod api;
mod utils;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "NumclassServer"; // for poem logging
const API_VERSION : &str = env!("CARGO_PKG_VERSION");

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Lazily initialize the parameters variable so that is has a 'static lifetime.
// We exit if we can't read our parameters.
lazy_static! {
    static ref RUNTIME_CTX: RuntimeCtx = init_runtime_context();
}

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // --------------- Initialize Server --------------
    println!("Starting numclass_server!");

    // Create the data directories and quit if that's all that was asked.
    if NUMCLASS_ARGS.create_dirs_only {
        println!("Data directories created under {}", NUMCLASS_DIRS.root_dir);
        return Ok(());
    }

    numclass_init();

    // --------------- Main Loop Set Up ---------------
    let config = &RUNTIME_CTX.parms.config;
    let app = make_app(config).map_err(|e| std::io::Error::other(e.to_string()))?;

    // ------------------ Main Loop -------------------
    let addr = format!("{}{}", "0.0.0.0:", config.http_port);
    let listener = if config.use_tls {
        let certs_dir = &RUNTIME_CTX.numclass_dirs.certs_dir;
        TcpListener::bind(addr).rustls(
            RustlsConfig::new().fallback(
                RustlsCertificate::new()
                    .key(std::fs::read(certs_dir.clone() + "/key.pem")?)
                    .cert(std::fs::read(certs_dir.clone() + "/cert.pem")?),
            ),
        ).boxed()
    } else {
        TcpListener::bind(addr).boxed()
    };

    poem::Server::new(listener)
        .name(SERVER_NAME)
        .run(app)
        .await
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// numclass_init:
// ---------------------------------------------------------------------------
/** Initialize logging and the runtime context before the main loop. */
fn numclass_init() {
    init_log();

    // Force the reading of input parameters and initialization of runtime context.
    info!("{}", Errors::InputParms(format!("{:#?}", *RUNTIME_CTX)));

    print_version_info();
}

// ---------------------------------------------------------------------------
// make_app:
// ---------------------------------------------------------------------------
/** Assemble the api endpoints, the generated openapi documents and the
 * swagger ui into one route tree.  CORS is open to every origin, method and
 * header.
 */
fn make_app(config: &Config) -> Result<impl Endpoint> {
    let fun_facts = FunFactClient::new(&config.fact_url_template, config.fact_timeout())?;

    let server_url = format!("{}:{}", config.http_addr, config.http_port);
    let endpoints = (RootApi::new(config), ClassifyNumberApi::new(fun_facts), VersionApi);
    let api_service =
        OpenApiService::new(endpoints, config.title.clone(), API_VERSION).server(server_url);

    // Allow the generated openapi specs to be retrieved from the server.
    let spec = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let ui = api_service.swagger_ui();

    Ok(Route::new()
        .nest("/docs", ui)
        .at("/spec", spec)
        .at("/spec_yaml", spec_yaml)
        .nest("/", api_service)
        .with(Cors::new()))
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    info!("\n*** Running NUMCLASS={}, BRANCH={}, COMMIT={}, DIRTY={}, SRC_TS={}, RUSTC={}.",
          API_VERSION,
          env!("GIT_BRANCH"),
          env!("GIT_COMMIT_SHORT"),
          env!("GIT_DIRTY"),
          env!("SOURCE_TIMESTAMP"),
          env!("RUSTC_VERSION"),
    );
}

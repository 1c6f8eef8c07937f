use dotenvy::dotenv;
use snafu::ResultExt as _;

use reelsync::api::{self, App};
use reelsync::config::Config;
use reelsync::error::{ApplicationError, OpenDataFileSnafu};
use reelsync::logger;

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let config = Config::from_env()?;

    let _guard = logger::init(&config)?;

    let app = App::open(&config.data_file).await.context(OpenDataFileSnafu {
        path: config.data_file.clone(),
    })?;

    api::serve(config.host, app).await
}

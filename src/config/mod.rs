mod settings;

pub use settings::{
    ApiConfig, DatabaseConfig, DispatchConfig, OtelConfig, ParameterSeed, ParametersConfig,
    RedisConfig, ServerConfig, Settings, TelegramConfig,
};

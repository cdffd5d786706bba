#[cfg(test)]
pub mod test {
    use std::time::Duration;

    use crate::Config;

    #[derive(Config, Debug, Default, PartialEq)]
    pub struct AppSection {
        #[config(env = "port", mapstructure = "port")]
        pub port: u16,

        #[config(env = "service_name", mapstructure = "service_name")]
        pub service_name: String,

        #[config(env = "interval_time_out", mapstructure = "interval_time_out")]
        pub interval_time_out: Duration,

        #[config(env = "required", mapstructure = "required", validate = "required")]
        pub required: bool,
    }

    /// Two tag conventions on one record: `env` keys follow the field
    /// names, `mapstructure` keys rename the host.
    #[derive(Config, Debug, Default, PartialEq)]
    pub struct Configuration {
        #[config(env = "host", mapstructure = "host_dir", validate = "required")]
        pub host: String,

        #[config(env = "app", mapstructure = "app", nested)]
        pub app: AppSection,
    }

    #[derive(Config, Debug, Default)]
    pub struct AdditionalConfig {
        #[config(env = "test_val")]
        pub test_val: i32,
    }

    #[derive(Config, Debug, Default)]
    pub struct MissingTag {
        pub test: i32,
    }

    #[derive(Config, Debug, Default)]
    pub struct Inner {
        #[config(env = "value", validate = "required")]
        pub value: String,
    }

    #[derive(Config, Debug, Default)]
    pub struct Unkeyed {
        #[config(env = "name")]
        pub name: String,

        /// Validated but never bound.
        #[config(validate = "required")]
        pub nickname: String,

        #[config(nested)]
        pub inner: Inner,

        pub untouched: u32,
    }

    #[derive(Config, Debug, Default)]
    pub struct Middle {
        #[config(env = "leaf")]
        pub leaf: String,
    }

    #[derive(Config, Debug, Default)]
    pub struct Outer {
        #[config(env = "middle", nested)]
        pub middle: Middle,

        #[config(env = "flag")]
        pub flag: bool,
    }

    #[derive(Config, Debug, Default)]
    pub struct Deep {
        #[config(env = "outer", nested)]
        pub outer: Outer,
    }

    #[derive(Config, Debug, Default)]
    pub struct ClashApp {
        #[config(env = "port")]
        pub port: u16,
    }

    #[derive(Config, Debug, Default)]
    pub struct Clashing {
        #[config(env = "app", nested)]
        pub app: ClashApp,

        #[config(env = "app_port")]
        pub app_port: u16,
    }

    #[derive(Config, Debug, Default)]
    pub struct Misdeclared {
        #[config(env = "name", validate = "sparkle")]
        pub name: String,
    }

    #[derive(Config, Debug, Default)]
    pub struct Conformed {
        #[config(env = "name", conform = "trim,lcase", validate = "required")]
        pub name: String,

        #[config(env = "level", conform = "trim,default=info", validate = "oneof=debug info warn")]
        pub level: String,

        #[config(env = "port", conform = "default=8080", validate = "min=1024")]
        pub port: u16,

        #[config(env = "peers", validate = "omitempty,min=2")]
        pub peers: Vec<String>,

        #[config(env = "timeout", validate = "max=1m")]
        pub timeout: Option<Duration>,
    }

    /// Two rules per field, so one field can fail more than once.
    #[derive(Config, Debug, Default)]
    pub struct Checked {
        #[config(env = "name", validate = "min=3,alphanum")]
        pub name: String,

        #[config(env = "port", validate = "required,min=1024")]
        pub port: u16,
    }

    #[derive(Config, Debug, Default)]
    pub struct Trio {
        #[config(env = "a", validate = "required")]
        pub a: String,

        #[config(env = "b", validate = "required")]
        pub b: u16,

        #[config(env = "c", validate = "required")]
        pub c: bool,
    }

    #[test]
    fn fixtures_default_to_zero_values() {
        let cfg = Configuration::default();
        assert!(cfg.host.is_empty());
        assert_eq!(cfg.app.port, 0);
        assert!(!cfg.app.required);
        assert!(MissingTag::schema().fields.is_empty());
    }
}

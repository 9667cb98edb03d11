//! 可观测性模块集成测试
//!
//! 验证指标记录函数在未安装 recorder 时可安全调用，以及配置组合行为。

mod metrics_tests {
    use espacios_shared::observability::metrics::{
        record_cascade, record_cascade_rows, register_cascade_metrics,
    };

    #[test]
    fn test_record_cascade() {
        record_cascade("delete_campus", "success", 0.05);
        record_cascade("mark_facultad_inactive", "success", 0.01);
        record_cascade("delete_bloque", "error", 0.2);
    }

    #[test]
    fn test_record_cascade_rows() {
        record_cascade_rows("delete_campus", "ambientes", 12);
        record_cascade_rows("delete_campus", "bloques", 0);
        record_cascade_rows("mark_campus_inactive", "facultades", 3);
    }

    #[test]
    fn test_register_metrics_twice() {
        register_cascade_metrics("svc-a");
        register_cascade_metrics("svc-a");
    }
}

mod config_tests {
    use espacios_shared::config::AppConfig;
    use espacios_shared::observability::ObservabilityConfig;

    #[test]
    fn test_observability_from_app_config() {
        let config = AppConfig {
            service_name: "espacios-cascade".to_string(),
            ..Default::default()
        };

        let obs = config
            .observability
            .clone()
            .with_service_name(&config.service_name);
        assert_eq!(obs.service_name, "espacios-cascade");
        assert_eq!(obs.log_level, ObservabilityConfig::default().log_level);
    }
}

pub mod cpu_features;

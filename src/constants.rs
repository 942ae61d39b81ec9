pub const DEFAULT_INPUT_PATH: &str = "D:/jimin/dataSet/healthData.csv";
pub const DEFAULT_INDEX_NAME: &str = "medical_data_mapping";
pub const DEFAULT_ES_URL: &str = "http://localhost:9200";
pub const DEFAULT_CHUNK_SIZE: usize = 5000;
pub const DEFAULT_ENCODING: &str = "cp949";

pub const USER_AGENT: &str = "health-bulk-loader/0.1";

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 订单提取错误（整条记录被丢弃）
    #[error("提取错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 消息源错误
    #[error("消息源错误: {0}")]
    Source(#[from] SourceError),
    /// 发布/输出错误
    #[error("发布错误: {0}")]
    Publish(#[from] PublishError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 订单提取错误
///
/// 只有结构性问题（表格太短、行格式错误、数量字段无法解析）才会产生此错误，
/// 枚举字段的内容问题永远不会走到这里。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// 消息正文中没有找到表格
    #[error("消息正文中没有找到订单表格")]
    NoTable,
    /// 表格行数不足
    #[error("订单表格只有 {actual} 行，至少需要 {required} 行")]
    TooShort { required: usize, actual: usize },
    /// 关键位置上的行不是 (标签, 值) 结构
    #[error("第 {position} 行格式错误: 只有 {cells} 个单元格")]
    MalformedRow { position: usize, cells: usize },
    /// 数量字段不是整数
    #[error("字段 {field} 的值 '{value}' 不是有效的数量")]
    InvalidCount { field: &'static str, value: String },
}

/// 软校验失败：单个枚举字段未能识别
///
/// 不作为控制流使用，只用于日志和报表中标记异常输入。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("字段 {field} 无法识别: '{raw}'")]
pub struct FieldValidationError {
    pub field: &'static str,
    pub raw: String,
}

/// 消息源错误
#[derive(Debug, Error)]
pub enum SourceError {
    /// 目录不存在
    #[error("消息目录不存在: {path}")]
    FolderNotFound { path: String },
    /// 读取失败
    #[error("读取消息失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 发布/输出错误
#[derive(Debug, Error)]
pub enum PublishError {
    /// 网络请求失败
    #[error("请求发布接口失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 发布接口返回非成功状态
    #[error("发布接口返回错误状态 ({endpoint}): {status}")]
    BadStatus { endpoint: String, status: u16 },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 序列化失败
    #[error("序列化报表失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 配置文件读取失败
    #[error("无法读取配置文件 {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("无法解析配置文件 {path}: {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建消息读取错误
    pub fn source_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Source(SourceError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建发布请求失败错误
    pub fn publish_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Publish(PublishError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Publish(PublishError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

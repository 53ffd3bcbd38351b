use serde::{Deserialize, Serialize};
use std::fmt;

/// 认知层级（布鲁姆分类法，1-6）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CognitiveLevel {
    /// 记忆
    Remember = 1,
    /// 理解
    Understand = 2,
    /// 应用
    Apply = 3,
    /// 分析
    Analyze = 4,
    /// 评价
    Evaluate = 5,
    /// 创造
    Create = 6,
}

impl CognitiveLevel {
    /// 全部层级，按升序
    pub const ALL: [CognitiveLevel; 6] = [
        CognitiveLevel::Remember,
        CognitiveLevel::Understand,
        CognitiveLevel::Apply,
        CognitiveLevel::Analyze,
        CognitiveLevel::Evaluate,
        CognitiveLevel::Create,
    ];

    /// 分类失败时使用的兜底层级
    pub const FALLBACK: CognitiveLevel = CognitiveLevel::Understand;

    /// 获取层级编号
    pub fn code(self) -> u8 {
        self as u8
    }

    /// 从 0 开始的下标
    pub fn index(self) -> usize {
        self as usize - 1
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            CognitiveLevel::Remember => "Remember",
            CognitiveLevel::Understand => "Understand",
            CognitiveLevel::Apply => "Apply",
            CognitiveLevel::Analyze => "Analyze",
            CognitiveLevel::Evaluate => "Evaluate",
            CognitiveLevel::Create => "Create",
        }
    }

    /// 从编号解析层级
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(CognitiveLevel::Remember),
            2 => Some(CognitiveLevel::Understand),
            3 => Some(CognitiveLevel::Apply),
            4 => Some(CognitiveLevel::Analyze),
            5 => Some(CognitiveLevel::Evaluate),
            6 => Some(CognitiveLevel::Create),
            _ => None,
        }
    }

    /// 从下标解析层级
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl From<CognitiveLevel> for u8 {
    fn from(level: CognitiveLevel) -> Self {
        level.code()
    }
}

impl TryFrom<u8> for CognitiveLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        CognitiveLevel::from_code(i64::from(value))
            .ok_or_else(|| format!("无效的认知层级: {}", value))
    }
}

impl fmt::Display for CognitiveLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.name())
    }
}

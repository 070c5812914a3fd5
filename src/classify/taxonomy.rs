//! Category vocabulary and the lookup tables used by the fallback chain

use crate::config::{CategoryEntry, KeywordRule, PatternRule, TaxonomyConfig};
use crate::{ConfigError, ConfigResult};
use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Pseudo-categories recorded when the pipeline could not judge the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStatus {
    /// Fewer than the minimum number of characters could be extracted
    InsufficientContent,
    /// The page could not be fetched or parsed
    AnalysisFailed,
}

impl PipelineStatus {
    pub const ALL: [PipelineStatus; 2] = [Self::InsufficientContent, Self::AnalysisFailed];

    pub fn label(&self) -> &'static str {
        match self {
            Self::InsufficientContent => "콘텐츠 부족",
            Self::AnalysisFailed => "분석 실패",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

/// The category stored with a link
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    /// A label from the taxonomy vocabulary
    Topic(String),
    /// A pipeline status pseudo-category
    Status(PipelineStatus),
}

impl Category {
    pub fn label(&self) -> &str {
        match self {
            Self::Topic(label) => label,
            Self::Status(status) => status.label(),
        }
    }

    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status(_))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A vocabulary entry with the description shown to the AI backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicEntry {
    pub name: String,
    pub description: String,
}

/// Substring rule over URL hosts or paths (keywords stored lowercase)
#[derive(Debug, Clone)]
pub struct HintRule {
    pub category: String,
    pub keywords: Vec<String>,
}

/// Compiled case-insensitive regex rule over AI responses
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    pub category: String,
    pub pattern: Regex,
}

/// Immutable category vocabulary plus the tables used by the fallback chain
///
/// Built once from configuration and shared read-only by the classifier and
/// the ingestion service.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    version: u32,
    topics: Vec<TopicEntry>,
    default_category: String,
    domain_rules: Vec<HintRule>,
    path_rules: Vec<HintRule>,
    keyword_rules: Vec<PatternMatcher>,
}

impl Taxonomy {
    /// Builds a taxonomy, checking that every rule and the default refer to
    /// vocabulary members and that every pattern compiles
    pub fn from_config(config: &TaxonomyConfig) -> ConfigResult<Self> {
        if config.categories.is_empty() {
            return Err(ConfigError::Validation(
                "taxonomy must define at least one category".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &config.categories {
            let name = entry.name.trim();
            if name.is_empty() {
                return Err(ConfigError::Validation(
                    "taxonomy category names cannot be empty".to_string(),
                ));
            }
            if PipelineStatus::from_label(name).is_some() {
                return Err(ConfigError::Validation(format!(
                    "'{}' is reserved for pipeline status",
                    name
                )));
            }
            if !seen.insert(name) {
                return Err(ConfigError::Validation(format!(
                    "duplicate taxonomy category '{}'",
                    name
                )));
            }
        }

        let known = |category: &str, table: &str| -> ConfigResult<()> {
            if seen.contains(category) {
                Ok(())
            } else {
                Err(ConfigError::Validation(format!(
                    "{} refers to unknown category '{}'",
                    table, category
                )))
            }
        };

        known(&config.default_category, "default")?;

        for rule in &config.domain_rules {
            known(&rule.category, "domain-rule")?;
        }
        for rule in &config.path_rules {
            known(&rule.category, "path-rule")?;
        }

        let mut keyword_rules = Vec::with_capacity(config.keyword_rules.len());
        for rule in &config.keyword_rules {
            known(&rule.category, "keyword-rule")?;
            let pattern = RegexBuilder::new(&rule.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| ConfigError::InvalidPattern {
                    category: rule.category.clone(),
                    message: e.to_string(),
                })?;
            keyword_rules.push(PatternMatcher {
                category: rule.category.clone(),
                pattern,
            });
        }

        Ok(Self {
            version: config.version,
            topics: config
                .categories
                .iter()
                .map(|c| TopicEntry {
                    name: c.name.trim().to_string(),
                    description: c.description.clone(),
                })
                .collect(),
            default_category: config.default_category.clone(),
            domain_rules: lowercase_rules(&config.domain_rules),
            path_rules: lowercase_rules(&config.path_rules),
            keyword_rules,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn topics(&self) -> &[TopicEntry] {
        &self.topics
    }

    /// Vocabulary labels in declaration order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|t| t.name.as_str())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.topics.iter().any(|t| t.name == label)
    }

    /// Looks up a vocabulary label
    pub fn topic(&self, label: &str) -> Option<Category> {
        self.contains(label)
            .then(|| Category::Topic(label.to_string()))
    }

    /// Looks up any storable category label, including status labels
    pub fn category(&self, label: &str) -> Option<Category> {
        let label = label.trim();
        self.topic(label)
            .or_else(|| PipelineStatus::from_label(label).map(Category::Status))
    }

    pub fn default_category(&self) -> Category {
        Category::Topic(self.default_category.clone())
    }

    pub fn domain_rules(&self) -> &[HintRule] {
        &self.domain_rules
    }

    pub fn path_rules(&self) -> &[HintRule] {
        &self.path_rules
    }

    pub fn keyword_rules(&self) -> &[PatternMatcher] {
        &self.keyword_rules
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::from_config(&builtin()).expect("built-in taxonomy is valid")
    }
}

fn lowercase_rules(rules: &[KeywordRule]) -> Vec<HintRule> {
    rules
        .iter()
        .map(|r| HintRule {
            category: r.category.clone(),
            keywords: r
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        })
        .collect()
}

/// Version of the built-in vocabulary
pub const BUILTIN_VERSION: u32 = 1;

/// Category used when nothing else applies
pub const BUILTIN_DEFAULT: &str = "기타";

const BUILTIN_TOPICS: &[(&str, &str)] = &[
    ("IT", "프론트엔드, 백엔드, 클라우드와 DevOps, 데이터베이스, 인공지능, 보안 등 개발과 기술"),
    ("경제", "창업, 스타트업, 마케팅, 금융, 투자, 경영, 부동산"),
    ("디자인", "그래픽 디자인, UI/UX, 사진, 영상, 일러스트레이션, 패션 디자인"),
    ("교육 & 학습", "온라인 강의, 코딩 학습, 언어 학습, 자기계발, 자격증, 시험 준비"),
    ("여가", "영화, 드라마, 웹툰, 게임 리뷰, 스트리밍, 여행, 스포츠, 독서"),
    ("뉴스", "국내외 뉴스, IT/테크 뉴스, 정치, 사회 이슈"),
    ("기타", "위 카테고리에 명확히 속하지 않는 콘텐츠"),
    ("음식", "요리, 레시피, 베이킹, 식재료, 맛집과 다이닝"),
    ("음악", "음악, 팟캐스트, 앨범, 아티스트, 플레이리스트, 공연"),
    ("생활 & 건강", "운동, 다이어트, 요가, 명상, 건강 관리, 청소와 정리정돈, 라이프스타일"),
];

const BUILTIN_KEYWORD_PATTERNS: &[(&str, &str)] = &[
    ("IT", "프론트엔드|백엔드|클라우드|DevOps|데이터베이스|데이터 분석|모바일 앱 개발|인공지능|게임 개발|블록체인|보안|네트워크|운영체제|개발 도구|알고리즘|IT|테크"),
    ("경제", "창업|스타트업|마케팅|광고|금융|투자|경영|전자상거래|부동산|인사|조직 관리"),
    ("디자인", "그래픽 디자인|UI/UX 디자인|사진|영상|일러스트레이션|애니메이션|산업 디자인|패션 디자인"),
    ("교육 & 학습", "온라인 강의|코딩|프로그래밍|언어 학습|자기계발|학술|연구|자격증|시험 준비"),
    ("여가", "영화|드라마|음악|팟캐스트|게임 리뷰|웹툰|만화|유튜브|스트리밍|이벤트|페스티벌|요리|레시피|건강|피트니스|패션|뷰티|자동차|스포츠|독서|서평|인테리어"),
    ("뉴스", "국내 뉴스|국제 뉴스|IT/테크 뉴스|정치|사회 이슈"),
    ("기타", "기타|분류불가|잡다|혼합|다목적|복합적|일반|무분류"),
    ("음식", "요리|레시피|음식|베이킹|쿠킹|식재료|다이닝"),
    ("음악", "음악|팟캐스트|노래|앨범|아티스트|플레이리스트|콘서트|공연"),
    ("생활 & 건강", "운동|헬스|피트니스|다이어트|요가|명상|웰빙|건강 관리|생활 습관|홈케어|청소|정리정돈|라이프스타일"),
];

const BUILTIN_DOMAIN_KEYWORDS: &[(&str, &[&str])] = &[
    ("IT", &["tech", "it", "dev", "cloud", "ai", "blockchain", "data", "security"]),
    ("경제", &["finance", "startup", "business", "marketing", "ecommerce", "realestate"]),
    ("디자인", &["design", "graphic", "ui", "ux", "illustration", "animation", "fashion"]),
    ("교육 & 학습", &["education", "learning", "course", "tutorial", "study"]),
    ("여가", &["movie", "music", "game", "festival", "cooking", "fitness", "sports"]),
    ("뉴스", &["news", "politics", "society", "world", "technews"]),
    ("기타", &["misc", "general", "uncategorized"]),
    ("음식", &["food", "recipe", "cooking", "baking", "dining"]),
    ("음악", &["music", "podcast", "concert", "artist", "playlist"]),
    ("생활 & 건강", &["health", "fitness", "wellness", "lifestyle", "yoga", "meditation", "homecare", "cleaning", "organizing"]),
];

const BUILTIN_PATH_KEYWORDS: &[(&str, &[&str])] = &[
    ("IT", &["docs", "api", "developer", "programming", "javascript", "python", "github", "code", "tech"]),
    ("경제", &["finance", "stock", "invest", "business", "startup", "marketing"]),
    ("디자인", &["design", "figma", "dribbble", "illustration", "typography"]),
    ("교육 & 학습", &["course", "lecture", "learn", "tutorial", "study", "lesson"]),
    ("여가", &["movie", "drama", "webtoon", "game", "travel", "sports"]),
    ("뉴스", &["news", "article", "press", "politics"]),
    ("음식", &["recipe", "food", "cooking", "restaurant"]),
    ("음악", &["music", "album", "playlist", "concert"]),
    ("생활 & 건강", &["health", "fitness", "workout", "diet", "yoga", "lifestyle"]),
];

/// The built-in vocabulary and tables, in the same shape a TOML
/// `[taxonomy]` section deserializes to
pub fn builtin() -> TaxonomyConfig {
    let keyword_rules = |table: &[(&str, &[&str])]| -> Vec<KeywordRule> {
        table
            .iter()
            .map(|(category, keywords)| KeywordRule {
                category: category.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
            })
            .collect()
    };

    TaxonomyConfig {
        version: BUILTIN_VERSION,
        default_category: BUILTIN_DEFAULT.to_string(),
        categories: BUILTIN_TOPICS
            .iter()
            .map(|(name, description)| CategoryEntry {
                name: name.to_string(),
                description: description.to_string(),
            })
            .collect(),
        domain_rules: keyword_rules(BUILTIN_DOMAIN_KEYWORDS),
        path_rules: keyword_rules(BUILTIN_PATH_KEYWORDS),
        keyword_rules: BUILTIN_KEYWORD_PATTERNS
            .iter()
            .map(|(category, pattern)| PatternRule {
                category: category.to_string(),
                pattern: pattern.to_string(),
            })
            .collect(),
    }
}

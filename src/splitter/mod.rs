//! Section-aware Splitter
//!
//! 반정형 문서(SDS 등)를 헤딩 동의어 매칭으로 레이블된 섹션으로 분할합니다.
//!
//! 1. 공백 정규화 (줄바꿈/탭 → 공백, 연속 두 칸 공백 제거)
//! 2. 레이블별 대소문자 무시 단어 경계 정규식 매칭
//! 3. 모든 매칭 위치를 오프셋 순으로 정렬
//! 4. 다음 매칭 위치까지를 해당 레이블의 스팬으로 할당

use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::catalog::{CatalogError, SectionCatalog};

// ============================================================================
// Types
// ============================================================================

/// 섹션 스팬 (정규화 텍스트 기준)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSpan {
    /// 정규 섹션 레이블
    pub label: String,
    /// 시작 바이트 오프셋 (헤딩 매칭 위치)
    pub start: usize,
    /// 끝 바이트 오프셋 (다음 매칭 위치 또는 텍스트 끝)
    pub end: usize,
    /// 스팬 텍스트 (앞뒤 공백 제거)
    pub text: String,
}

/// 헤딩 매칭 이벤트
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct MatchEvent {
    offset: usize,
    /// 카탈로그 내 레이블 순서
    label_index: usize,
}

/// 분할 결과: 레이블 → 섹션 텍스트
///
/// 키 순서는 각 레이블이 처음 등장한 순서, 값은 마지막 등장 위치의 스팬입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Sections {
    inner: IndexMap<String, String>,
}

impl Sections {
    pub fn get(&self, label: &str) -> Option<&str> {
        self.inner.get(label).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.inner.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl IntoIterator for Sections {
    type Item = (String, String);
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// 공백 정규화
///
/// `\n`, `\t`를 공백으로 바꾼 뒤 연속된 두 칸 공백을 왼쪽부터 겹치지 않게 제거합니다.
/// 일반적인 공백 축약이 아니며 오프셋에 영향을 주므로 그대로 유지해야 합니다.
pub fn normalize_text(text: &str) -> String {
    text.replace('\n', " ").replace('\t', " ").replace("  ", "")
}

// ============================================================================
// SectionSplitter
// ============================================================================

/// 섹션 인식 분할기
///
/// 카탈로그의 레이블별 매처를 한 번 컴파일하여 여러 문서에 재사용합니다.
/// 상태가 없으므로 스레드 간 공유가 가능합니다.
#[derive(Debug, Clone)]
pub struct SectionSplitter {
    matchers: Vec<(String, Regex)>,
}

impl SectionSplitter {
    /// 카탈로그로 분할기 생성
    pub fn new(catalog: &SectionCatalog) -> Result<Self, CatalogError> {
        let matchers = catalog
            .iter()
            .map(|(label, synonyms)| {
                let alternation = synonyms
                    .iter()
                    .map(|s| regex::escape(s))
                    .collect::<Vec<_>>()
                    .join("|");

                RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
                    .case_insensitive(true)
                    .build()
                    .map(|re| (label.to_string(), re))
                    .map_err(|source| CatalogError::Pattern {
                        label: label.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { matchers })
    }

    /// 기본 SDS 카탈로그로 생성
    pub fn sds_default() -> Result<Self, CatalogError> {
        Self::new(&SectionCatalog::sds_default())
    }

    /// 텍스트를 섹션으로 분할
    ///
    /// 같은 레이블이 여러 번 등장하면 마지막 스팬이 남습니다.
    /// 매칭되지 않은 레이블은 결과에 포함되지 않습니다.
    pub fn split(&self, text: &str) -> Sections {
        let mut inner = IndexMap::new();

        for span in self.spans(text) {
            inner.insert(span.label, span.text);
        }

        Sections { inner }
    }

    /// 모든 섹션 스팬을 오프셋 순으로 반환 (중복 레이블 포함)
    pub fn spans(&self, text: &str) -> Vec<SectionSpan> {
        let normalized = normalize_text(text);
        if normalized.trim().is_empty() {
            return vec![];
        }

        let events = self.match_events(&normalized);

        events
            .iter()
            .enumerate()
            .map(|(i, event)| {
                let end = events
                    .get(i + 1)
                    .map(|next| next.offset)
                    .unwrap_or(normalized.len());

                SectionSpan {
                    label: self.matchers[event.label_index].0.clone(),
                    start: event.offset,
                    end,
                    text: trim_span(&normalized[event.offset..end]).to_string(),
                }
            })
            .collect()
    }

    /// 모든 레이블의 매칭 위치 수집 후 정렬
    ///
    /// 같은 오프셋에서 여러 레이블이 매칭되면 카탈로그 순서가 앞선 레이블만 남깁니다.
    fn match_events(&self, normalized: &str) -> Vec<MatchEvent> {
        let mut events: Vec<MatchEvent> = self
            .matchers
            .iter()
            .enumerate()
            .flat_map(|(label_index, (_, re))| {
                re.find_iter(normalized).map(move |m| MatchEvent {
                    offset: m.start(),
                    label_index,
                })
            })
            .collect();

        events.sort();
        events.dedup_by_key(|e| e.offset);

        tracing::trace!("Found {} heading matches", events.len());
        events
    }
}

/// 스팬 앞뒤 공백 제거
///
/// 유니코드 공백 외에 정보 구분자(U+001C..U+001F)도 공백으로 취급합니다.
fn trim_span(span: &str) -> &str {
    span.trim_matches(|c: char| c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c))
}

/// 텍스트를 카탈로그 기준으로 분할
///
/// 반복 호출 시에는 [`SectionSplitter`]를 만들어 재사용하는 것이 좋습니다.
pub fn split(text: &str, catalog: &SectionCatalog) -> Result<Sections, CatalogError> {
    Ok(SectionSplitter::new(catalog)?.split(text))
}

// ============================================================================
// Tests
// ============================================================================

// region:    --- Categories

/// 카테고리 목록 (이름순)
pub const LIST_CATEGORIES: &str = "SELECT id, name FROM categories ORDER BY name, id";

/// 카테고리 조회
pub const GET_CATEGORY: &str = "SELECT id, name FROM categories WHERE id = $1";

/// 카테고리 생성
pub const INSERT_CATEGORY: &str = "INSERT INTO categories (name) VALUES ($1) RETURNING id, name";

/// 카테고리 이름 수정
pub const UPDATE_CATEGORY: &str =
    "UPDATE categories SET name = $1 WHERE id = $2 RETURNING id, name";

/// 카테고리 삭제
pub const DELETE_CATEGORY: &str = "DELETE FROM categories WHERE id = $1";

// endregion: --- Categories

// region:    --- Ads

/// 광고 + 작성자 표시 이름. 검색 조건은 `WHERE 1=1` 뒤에 붙인다
pub const SELECT_AD_ROWS: &str = r#"
    SELECT a.id, a.name, a.author_id, a.price, a.description, a.is_published, a.category_id, a.image,
           COALESCE(NULLIF(u.first_name, ''), u.username) AS author
    FROM ads a
    JOIN users u ON u.id = a.author_id
    WHERE 1=1"#;

/// 검색 결과 개수
pub const COUNT_AD_ROWS: &str = "SELECT COUNT(*) FROM ads a WHERE 1=1";

/// 광고 정렬 (가격 내림차순)
pub const ORDER_ADS_BY_PRICE: &str = " ORDER BY a.price DESC, a.id ASC";

/// 검색 트랜잭션 격리 수준 (트랜잭션 첫 문장이어야 함)
pub const SET_REPEATABLE_READ: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ";

/// 광고 생성
pub const INSERT_AD: &str = r#"
    INSERT INTO ads (name, author_id, price, description, is_published, category_id)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id
"#;

/// 광고 부분 수정 (NULL 인 값은 유지)
pub const UPDATE_AD: &str = r#"
    UPDATE ads SET
        name = COALESCE($1, name),
        price = COALESCE($2, price),
        description = COALESCE($3, description),
        is_published = COALESCE($4, is_published),
        category_id = COALESCE($5, category_id)
    WHERE id = $6
    RETURNING id
"#;

/// 광고 이미지 교체, 이전 이미지 키 반환
pub const SET_AD_IMAGE: &str = r#"
    UPDATE ads a SET image = $1
    FROM (SELECT id, image FROM ads WHERE id = $2 FOR UPDATE) old
    WHERE a.id = old.id
    RETURNING old.image
"#;

/// 광고 삭제
pub const DELETE_AD: &str = "DELETE FROM ads WHERE id = $1";

// endregion: --- Ads

// region:    --- Selections

/// 셀렉션 + 항목 id 배열
pub const SELECT_SELECTIONS: &str = r#"
    SELECT s.id, s.name, s.owner_id,
           ARRAY(SELECT si.ad_id FROM selection_items si WHERE si.selection_id = s.id ORDER BY si.ad_id) AS items
    FROM selections s
"#;

/// 셀렉션 생성
pub const INSERT_SELECTION: &str =
    "INSERT INTO selections (name, owner_id) VALUES ($1, $2) RETURNING id";

/// 셀렉션 이름 수정
pub const UPDATE_SELECTION_NAME: &str = "UPDATE selections SET name = $1 WHERE id = $2";

/// 셀렉션 존재 여부 잠금
pub const LOCK_SELECTION: &str = "SELECT id FROM selections WHERE id = $1 FOR UPDATE";

/// 셀렉션 항목 전체 삭제
pub const CLEAR_SELECTION_ITEMS: &str = "DELETE FROM selection_items WHERE selection_id = $1";

/// 셀렉션 항목 추가
pub const INSERT_SELECTION_ITEMS: &str = r#"
    INSERT INTO selection_items (selection_id, ad_id)
    SELECT $1, UNNEST($2::BIGINT[])
    ON CONFLICT DO NOTHING
"#;

/// 셀렉션 삭제
pub const DELETE_SELECTION: &str = "DELETE FROM selections WHERE id = $1";

// endregion: --- Selections

// region:    --- Users

/// 사용자 + 지역 목록 + 게시 광고 수
pub const SELECT_USERS: &str = r#"
    SELECT u.id, u.username, u.password_hash, u.first_name, u.last_name, u.role,
           ARRAY(
               SELECT l.name FROM user_locations ul
               JOIN locations l ON l.id = ul.location_id
               WHERE ul.user_id = u.id
               ORDER BY l.name
           ) AS locations,
           (SELECT COUNT(*) FROM ads a WHERE a.author_id = u.id AND a.is_published) AS total_ads
    FROM users u
"#;

/// 사용자 수
pub const COUNT_USERS: &str = "SELECT COUNT(*) FROM users";

/// 사용자 생성
pub const INSERT_USER: &str = r#"
    INSERT INTO users (username, password_hash, first_name, last_name, role)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id
"#;

/// 사용자 부분 수정
pub const UPDATE_USER: &str = r#"
    UPDATE users SET
        first_name = COALESCE($1, first_name),
        last_name = COALESCE($2, last_name),
        password_hash = COALESCE($3, password_hash)
    WHERE id = $4
    RETURNING id
"#;

/// 지역 upsert 후 id 반환
pub const UPSERT_LOCATIONS: &str = r#"
    INSERT INTO locations (name)
    SELECT UNNEST($1::TEXT[])
    ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
    RETURNING id
"#;

/// 사용자 지역 연결 전체 삭제
pub const CLEAR_USER_LOCATIONS: &str = "DELETE FROM user_locations WHERE user_id = $1";

/// 사용자 지역 연결
pub const INSERT_USER_LOCATIONS: &str = r#"
    INSERT INTO user_locations (user_id, location_id)
    SELECT $1, UNNEST($2::BIGINT[])
    ON CONFLICT DO NOTHING
"#;

/// 사용자 광고의 이미지 키 (삭제 전 파일 정리용)
pub const USER_AD_IMAGES: &str = r#"
    SELECT image FROM ads
    WHERE author_id = $1 AND image IS NOT NULL
    FOR UPDATE
"#;

/// 사용자 삭제 (광고, 셀렉션, 토큰은 CASCADE)
pub const DELETE_USER: &str = "DELETE FROM users WHERE id = $1";

// endregion: --- Users

// region:    --- Tokens

/// 토큰 발급 (사용자당 1개, 있으면 기존 토큰)
pub const ISSUE_TOKEN: &str = r#"
    INSERT INTO auth_tokens (key, user_id) VALUES ($1, $2)
    ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
    RETURNING key
"#;

/// 토큰으로 사용자 id 조회
pub const GET_TOKEN_USER: &str = "SELECT user_id FROM auth_tokens WHERE key = $1";

// endregion: --- Tokens

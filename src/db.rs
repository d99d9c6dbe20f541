use sqlx::MySqlPool;

pub async fn init_db(database_url: &str) -> MySqlPool {
    let pool = MySqlPool::connect(database_url)
        .await
        .expect("Failed to connect to database");

    ensure_schema(&pool)
        .await
        .expect("Failed to ensure database schema");

    pool
}

/// Create the tables on first boot. The (employee_id, date) unique key is
/// what makes get-or-create race down to a single row per day, and the
/// auth_code unique key is what code allocation retries against.
async fn ensure_schema(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            address TEXT NOT NULL,
            phone VARCHAR(15) NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL,
            company_id BIGINT UNSIGNED NOT NULL,
            standard_check_in TIME NOT NULL,
            standard_check_out TIME NOT NULL,
            auth_code CHAR(6) NOT NULL,
            UNIQUE KEY uq_employees_email (email),
            UNIQUE KEY uq_employees_auth_code (auth_code),
            CONSTRAINT fk_employees_company FOREIGN KEY (company_id)
                REFERENCES companies (id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS time_records (
            id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
            employee_id BIGINT UNSIGNED NOT NULL,
            date DATE NOT NULL,
            check_in TIME NULL,
            break_seconds BIGINT NULL,
            check_out TIME NULL,
            UNIQUE KEY uq_time_records_employee_date (employee_id, date),
            CONSTRAINT fk_time_records_employee FOREIGN KEY (employee_id)
                REFERENCES employees (id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

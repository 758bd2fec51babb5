//! Ledger schema: cases, donations, handovers, followups and roles.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(LEDGER_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS user_roles, followup_actions, donation_handovers, donations, cases CASCADE;",
        )
        .await?;
        Ok(())
    }
}

const LEDGER_SQL: &str = r"
-- Sponsored families
CREATE TABLE cases (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    title TEXT NOT NULL,
    title_ar TEXT,
    monthly_cost NUMERIC(12, 2) NOT NULL DEFAULT 0,
    months_needed INTEGER,
    months_covered INTEGER NOT NULL DEFAULT 0,
    status VARCHAR(32) NOT NULL DEFAULT 'active',
    lifecycle_status VARCHAR(32) NOT NULL DEFAULT 'active',
    is_published BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_cases_monthly_cost CHECK (monthly_cost >= 0),
    CONSTRAINT chk_cases_months_needed CHECK (months_needed IS NULL OR months_needed > 0),
    CONSTRAINT chk_cases_months_covered CHECK (months_covered >= 0),
    CONSTRAINT chk_cases_lifecycle CHECK (
        lifecycle_status IN ('active', 'removed', 'parked', 'under_more_investigation', 'completed')
    )
);

CREATE INDEX idx_cases_published ON cases(is_published, created_at DESC);

-- Donor pledges
CREATE TABLE donations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    case_id UUID NOT NULL REFERENCES cases(id),
    donor_name TEXT,
    donor_email TEXT,
    amount NUMERIC(12, 2) NOT NULL,
    donation_type VARCHAR(16) NOT NULL DEFAULT 'monthly',
    months_pledged INTEGER NOT NULL DEFAULT 1,
    status VARCHAR(16) NOT NULL DEFAULT 'pending',
    payment_code VARCHAR(16) NOT NULL,
    payment_reference TEXT,
    admin_notes TEXT,
    total_handed_over NUMERIC(12, 2) NOT NULL DEFAULT 0,
    confirmed_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    confirmed_at TIMESTAMPTZ,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_donations_amount CHECK (amount > 0),
    CONSTRAINT chk_donations_type CHECK (donation_type IN ('monthly', 'custom')),
    CONSTRAINT chk_donations_status CHECK (status IN ('pending', 'confirmed', 'cancelled', 'redeemed'))
);

CREATE INDEX idx_donations_case ON donations(case_id, created_at DESC);
CREATE INDEX idx_donations_status ON donations(status, confirmed_at DESC);

-- Money handed to a family from one donation
CREATE TABLE donation_handovers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    case_id UUID NOT NULL REFERENCES cases(id),
    donation_id UUID NOT NULL REFERENCES donations(id),
    handover_amount NUMERIC(12, 2) NOT NULL,
    handover_date DATE NOT NULL,
    handover_notes TEXT,
    is_report_checkpoint BOOLEAN NOT NULL DEFAULT false,
    report_image_url TEXT,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_handovers_amount CHECK (handover_amount > 0),
    CONSTRAINT chk_handovers_checkpoint CHECK (
        NOT is_report_checkpoint OR coalesce(btrim(report_image_url), '') <> ''
    )
);

CREATE INDEX idx_handovers_case ON donation_handovers(case_id, handover_date DESC);
CREATE INDEX idx_handovers_donation ON donation_handovers(donation_id);
CREATE INDEX idx_handovers_date ON donation_handovers(handover_date);

-- Tasks scheduled against a case
CREATE TABLE followup_actions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    case_id UUID NOT NULL REFERENCES cases(id),
    title TEXT NOT NULL,
    description TEXT,
    action_date DATE NOT NULL,
    requires_case_action BOOLEAN NOT NULL DEFAULT false,
    requires_volunteer_action BOOLEAN NOT NULL DEFAULT false,
    answer_type VARCHAR(16) NOT NULL DEFAULT 'none',
    answer_options JSONB,
    answer TEXT,
    status VARCHAR(16) NOT NULL DEFAULT 'pending',
    completed_at TIMESTAMPTZ,
    completed_by UUID,
    completion_notes TEXT,
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_followups_answer_type CHECK (answer_type IN ('none', 'text', 'single_choice', 'photo')),
    CONSTRAINT chk_followups_status CHECK (status IN ('pending', 'completed', 'cancelled'))
);

CREATE INDEX idx_followups_case ON followup_actions(case_id, action_date);

-- Role grants for authenticated users
CREATE TABLE user_roles (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    role VARCHAR(32) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_user_roles UNIQUE (user_id, role),
    CONSTRAINT chk_user_roles_role CHECK (role IN ('admin', 'volunteer', 'donor'))
);
";

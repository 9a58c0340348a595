use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Seniority level of an employee. Stored as text using the variant name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    Principal,
    Senior,
    Professional,
    Junior,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Principal => "Principal",
            Role::Senior => "Senior",
            Role::Professional => "Professional",
            Role::Junior => "Junior",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Principal" => Ok(Role::Principal),
            "Senior" => Ok(Role::Senior),
            "Professional" => Ok(Role::Professional),
            "Junior" => Ok(Role::Junior),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub yearly_salary: Decimal,
    /// Employer-borne cost per year on top of the salary.
    pub yearly_cost: Decimal,
}

/// Payload for creating or replacing an employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeInput {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub yearly_salary: Decimal,
    #[serde(default)]
    pub yearly_cost: Decimal,
}

impl EmployeeInput {
    pub fn into_employee(self, id: i64) -> Employee {
        Employee {
            id,
            name: self.name,
            email: self.email,
            role: self.role,
            yearly_salary: self.yearly_salary,
            yearly_cost: self.yearly_cost,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct EmployeeRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub yearly_salary: Decimal,
    pub yearly_cost: Decimal,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = String;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        Ok(Employee {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse()?,
            yearly_salary: row.yearly_salary,
            yearly_cost: row.yearly_cost,
        })
    }
}

/// Salary and yearly cost of one employee, as consumed by offer pricing.
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct EmployeeCost {
    pub employee_id: i64,
    pub yearly_salary: Decimal,
    pub yearly_cost: Decimal,
}
